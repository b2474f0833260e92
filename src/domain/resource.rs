//! Resource kinds served by the upstream generator

use derive_more::Display;

/// Which upstream template and download defaults apply to a request.
///
/// The discriminator is matched case-insensitively. Anything other than the
/// script keyword selects a manifest archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ResourceKind {
    #[default]
    #[display("zip")]
    Manifest,
    #[display("lua")]
    Script,
}

impl ResourceKind {
    pub const SCRIPT_KEYWORD: &'static str = "lua";

    pub fn from_discriminator(value: &str) -> Self {
        if value.eq_ignore_ascii_case(Self::SCRIPT_KEYWORD) {
            Self::Script
        } else {
            Self::Manifest
        }
    }

    /// Missing discriminators select a manifest archive
    pub fn from_optional(value: Option<&str>) -> Self {
        value.map(Self::from_discriminator).unwrap_or_default()
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Manifest => "zip",
            Self::Script => "lua",
        }
    }

    /// Content type used when the upstream does not send one
    pub fn default_content_type(self) -> &'static str {
        match self {
            Self::Manifest => "application/zip",
            Self::Script => "text/x-lua",
        }
    }

    pub fn fallback_filename(self, resource_id: &str) -> String {
        format!("manifest_{resource_id}.{}", self.file_extension())
    }

    /// `Content-Disposition` used when the upstream does not send one
    pub fn fallback_disposition(self, resource_id: &str) -> String {
        format!(
            "attachment; filename=\"{}\"",
            self.fallback_filename(resource_id)
        )
    }
}
