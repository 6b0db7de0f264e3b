//! ID generator port for producing unique identifiers.

/// Generates unique identifiers.
///
/// Used to name per-run checkout workspaces so concurrent runs never share
/// a directory; tests substitute a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
