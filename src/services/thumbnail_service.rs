use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::AppError;

pub const MAGICK_BINARY: &str = "magick";

const DENSITY: &str = "300";
const BOUNDING_BOX: &str = "800x800";

pub struct RasterOutput {
    /// Stderr text from a successful invocation; advisory only.
    pub warning: Option<String>,
}

/// Renders page 0 of a PDF to a PNG thumbnail at the given path.
pub trait Rasterizer {
    fn rasterize(&self, pdf: &Path, thumbnail: &Path) -> Result<RasterOutput, AppError>;
}

/// Production rasterizer shelling out to ImageMagick.
pub struct MagickRasterizer;

impl MagickRasterizer {
    /// Fails up front when the binary is missing, instead of once per PDF.
    pub fn detect() -> Result<Self, AppError> {
        which::which(MAGICK_BINARY).map_err(|_| {
            AppError::General(format!(
                "{MAGICK_BINARY} not found on PATH; install ImageMagick to generate thumbnails"
            ))
        })?;
        Ok(MagickRasterizer)
    }
}

impl Rasterizer for MagickRasterizer {
    fn rasterize(&self, pdf: &Path, thumbnail: &Path) -> Result<RasterOutput, AppError> {
        let output = Command::new(MAGICK_BINARY)
            .args(invocation_args(pdf, thumbnail))
            .output()?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(AppError::Rasterizer {
                file: pdf.display().to_string(),
                message: if stderr.is_empty() {
                    format!("exit status {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(RasterOutput {
            warning: (!stderr.is_empty()).then_some(stderr),
        })
    }
}

// Page 0 only, flattened onto white with alpha removed, capped to the
// bounding box. Any rasterizer honoring this contract is a valid substitute.
fn invocation_args(pdf: &Path, thumbnail: &Path) -> Vec<OsString> {
    let mut first_page = pdf.as_os_str().to_os_string();
    first_page.push("[0]");

    let mut args: Vec<OsString> = vec!["-density".into(), DENSITY.into(), first_page];
    for flag in [
        "-background",
        "white",
        "-flatten",
        "-alpha",
        "off",
        "-resize",
        BOUNDING_BOX,
    ] {
        args.push(flag.into());
    }
    args.push(thumbnail.as_os_str().to_os_string());
    args
}
