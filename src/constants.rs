// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// User-facing texts
pub mod messages {
    /// Title of the result dialog
    pub const DIALOG_TITLE: &str = "QR code result:";

    /// Label of the single dismiss action
    pub const DIALOG_DISMISS: &str = "ok";

    /// Decoder ran and found nothing
    pub const NO_CODE_FOUND: &str = "No QR code found in the Image";

    /// Gallery selection returned nothing
    pub const SELECT_IMAGE: &str = "please select an image";

    /// Camera capture was cancelled or produced no data
    pub const CLICK_IMAGE: &str = "please click an image";

    /// Any other failure
    pub const SOMETHING_WRONG: &str = "something went wrong";
}

/// Decoder policy
pub mod decoding {
    /// Only the first detected code is ever presented
    pub const CONSUMED_RESULTS: usize = 1;

    /// Default bound for the longer image side before detection
    pub const DEFAULT_MAX_DIMENSION: u32 = 1280;
}

/// Image acquisition defaults
pub mod acquisition {
    /// Default gallery filter
    pub const DEFAULT_MIME_FILTER: &str = "image/*";

    /// Name of the staged camera capture inside private storage
    pub const STAGING_FILE_NAME: &str = "qrcode.jpg";

    /// Placeholder in the camera command that receives the staging path
    pub const OUTPUT_PLACEHOLDER: &str = "{output}";

    /// Default external camera command
    pub const DEFAULT_CAMERA_COMMAND: &[&str] = &["fswebcam", "--no-banner", OUTPUT_PLACEHOLDER];

    /// Rotation applied to every acquired image
    pub const NO_ROTATION: u16 = 0;
}

/// Application directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "qrscan";

/// Supported file formats
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &[
        "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "pnm", "pgm", "ppm",
    ];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }

    /// Extensions matching a MIME filter such as `image/*` or `image/png`
    ///
    /// Returns an empty list for filters outside the `image` type.
    pub fn extensions_for_mime(filter: &str) -> Vec<&'static str> {
        let Some((kind, subtype)) = filter.trim().split_once('/') else {
            return Vec::new();
        };
        if !kind.eq_ignore_ascii_case("image") {
            return Vec::new();
        }

        match subtype.to_lowercase().as_str() {
            "*" => IMAGE_EXTENSIONS.to_vec(),
            "jpeg" | "jpg" => vec!["jpg", "jpeg"],
            "tiff" => vec!["tif", "tiff"],
            "x-portable-anymap" => vec!["pnm", "pgm", "ppm"],
            other => IMAGE_EXTENSIONS
                .iter()
                .copied()
                .filter(|ext| *ext == other)
                .collect(),
        }
    }
}
