use crate::Role;

/// Implementations wired at process start. Replaces the source's
/// directory-presence check with a static table — the router never touches
/// the filesystem to decide whether an implementation exists.
const REGISTRY: &[(&str, Role, &str)] = &[
    ("sudoku-9x9", Role::Generator, "legacy"),
    ("sudoku-9x9", Role::Generator, "novus"),
    ("sudoku-9x9", Role::Solver, "legacy"),
    ("sudoku-9x9", Role::Solver, "novus"),
    ("sudoku-9x9", Role::Printer, "legacy"),
];

pub fn is_registered(puzzle_kind: &str, role: Role, impl_id: &str) -> bool {
    REGISTRY
        .iter()
        .any(|(k, r, i)| *k == puzzle_kind && *r == role && *i == impl_id)
}

pub fn is_puzzle_known(puzzle_kind: &str) -> bool {
    REGISTRY.iter().any(|(k, _, _)| *k == puzzle_kind)
}
