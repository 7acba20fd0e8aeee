//! Rename rule engine
//!
//! Computes the output name of a single file under a [`ProcessingProfile`]:
//!
//! 1. the first rename rule whose prefix starts the name replaces that prefix
//! 2. the first occurrence of the profile suffix (e.g. `-001`) is removed
//! 3. `ResultadosMSPS_*` files are instead named `{folder}{separator}CUV{ext}`,
//!    always from the original folder name

use crate::domain::{ProcessingProfile, CUV_SOURCE_MARKER};

/// Seam used by the archive assembler to compute output names
pub trait Renamer {
    /// Returns the output name of `original_name` inside `folder_name`
    fn rename(&self, original_name: &str, folder_name: &str, profile: &ProcessingProfile)
        -> String;
}

/// [`Renamer`] backed by the profile's rules
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleRenamer;

impl Renamer for RuleRenamer {
    fn rename(
        &self,
        original_name: &str,
        folder_name: &str,
        profile: &ProcessingProfile,
    ) -> String {
        rename_file(original_name, folder_name, profile)
    }
}

/// Computes the output name of a file
///
/// Never fails: a name no rule touches comes back unchanged.
///
/// # Examples
///
/// ```
/// use cuvs::core::transform::rename::rename_file;
/// use cuvs::domain::ProcessingProfile;
///
/// let profile = ProcessingProfile::otras_eps();
/// assert_eq!(rename_file("70-1372772-001.xml", "70-1372772-001", &profile), "FE1372772.xml");
/// assert_eq!(
///     rename_file("ResultadosMSPS_abc.json", "70-1372772-001", &profile),
///     "70-1372772-001CUV.json"
/// );
/// ```
pub fn rename_file(original_name: &str, folder_name: &str, profile: &ProcessingProfile) -> String {
    if original_name.starts_with(CUV_SOURCE_MARKER) {
        return format!(
            "{folder_name}{}CUV{}",
            profile.cuv_separator,
            extension_of(original_name)
        );
    }

    let renamed = apply_prefix_rules(original_name, profile);
    strip_suffix_once(&renamed, &profile.suffix_to_strip)
}

/// Applies at most one prefix rule, scanning in declaration order
fn apply_prefix_rules(name: &str, profile: &ProcessingProfile) -> String {
    profile
        .rename_rules
        .iter()
        .find(|rule| !rule.prefix.is_empty() && name.starts_with(&rule.prefix))
        .map(|rule| name.replacen(&rule.prefix, &rule.replacement, 1))
        .unwrap_or_else(|| name.to_string())
}

fn strip_suffix_once(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return name.to_string();
    }
    name.replacen(suffix, "", 1)
}

/// Substring from (and including) the last `.`, empty when there is none
pub(crate) fn extension_of(name: &str) -> &str {
    name.rfind('.').map(|idx| &name[idx..]).unwrap_or("")
}

/// Name without the part returned by [`extension_of`]
pub(crate) fn stem_of(name: &str) -> &str {
    name.rfind('.').map(|idx| &name[..idx]).unwrap_or(name)
}
