mod legacy;
mod novus;

pub use legacy::LegacyGenerator;
pub use novus::NovusGenerator;

fn natural_alphabet_9() -> Vec<String> {
    (1..=9).map(|d| d.to_string()).collect()
}
