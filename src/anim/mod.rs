//! Document assembler: whole-file encode and decode built on the
//! grammar, unit and conversion modules, plus the import-side transform
//! pipeline.

mod decode;
mod encode;

pub use decode::*;
pub use encode::*;

/// How node names are cleaned before they hit the token grammar.
///
/// Declaration lines are whitespace-tokenized, so a name containing
/// whitespace corrupts the file for every reader; the default policy
/// guards against exactly that and nothing more.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SanitizePolicy {
    /// Emit names verbatim.
    Off,
    /// Replace whitespace runs with a single underscore.
    #[default]
    Whitespace,
    /// Replace every character outside `[A-Za-z0-9_]`.
    NonAlphanumeric,
}

/// Apply a sanitize policy to a node name.
pub fn sanitize_name(name: &str, policy: SanitizePolicy) -> String {
    match policy {
        SanitizePolicy::Off => name.to_string(),
        SanitizePolicy::Whitespace => name.split_whitespace().collect::<Vec<_>>().join("_"),
        SanitizePolicy::NonAlphanumeric => name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_policies() {
        assert_eq!(sanitize_name("left arm  IK", SanitizePolicy::Off), "left arm  IK");
        assert_eq!(sanitize_name("left arm  IK", SanitizePolicy::Whitespace), "left_arm_IK");
        assert_eq!(
            sanitize_name("spine.01 [mid]", SanitizePolicy::NonAlphanumeric),
            "spine_01__mid_"
        );
    }
}
