use strum::EnumString;

pub trait MimeType {
    fn mime_type(&self) -> &str;
}

/// Output formats accepted by the creative upscale endpoint
#[derive(Debug, Default, PartialEq, Hash, Eq, Copy, Clone, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Webp,
    #[strum(serialize = "png")]
    Png,
    #[strum(serialize = "jpeg", serialize = "jpg")]
    Jpeg,
}

impl OutputFormat {
    /// Value sent as `output_format` form field
    pub fn name(&self) -> &str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

impl MimeType for OutputFormat {
    fn mime_type(&self) -> &str {
        match &self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}
