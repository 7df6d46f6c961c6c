//! PNG export with embedded render parameters (tEXt chunks).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use multibrot_core::{EvalConfig, PlaneRegion};
use multibrot_render::{RenderBuffer, ThemeInfo};

use crate::error::CliError;

/// Parameters recorded alongside the image.
pub struct ExportMetadata<'a> {
    pub region: PlaneRegion,
    pub config: EvalConfig,
    pub theme: &'a ThemeInfo,
}

impl ExportMetadata<'_> {
    fn description(&self) -> String {
        format!(
            "Multibrot order {} - Region: {}, Zoom: {:.6}, Iterations: {}, Theme: {}",
            self.config.order,
            self.region,
            self.region.zoom_factor(),
            self.config.max_iterations,
            self.theme.name,
        )
    }

    fn pairs(&self, image: &RenderBuffer) -> Vec<(String, String)> {
        let r = &self.region;
        vec![
            ("Multibrot.Order".into(), self.config.order.to_string()),
            ("Multibrot.MaxIterations".into(), self.config.max_iterations.to_string()),
            ("Multibrot.XMin".into(), r.xmin.to_string()),
            ("Multibrot.XMax".into(), r.xmax.to_string()),
            ("Multibrot.YMin".into(), r.ymin.to_string()),
            ("Multibrot.YMax".into(), r.ymax.to_string()),
            ("Multibrot.Theme".into(), self.theme.name.clone()),
            ("Multibrot.ThemeKind".into(), self.theme.theme_kind.label().into()),
            ("Multibrot.PaletteKind".into(), self.theme.palette_kind.label().into()),
            ("Multibrot.Resolution".into(), format!("{}x{}", image.width, image.height)),
        ]
    }
}

/// Write `image` as an 8-bit RGB PNG with the render parameters attached.
pub fn export_png(
    image: &RenderBuffer,
    path: &Path,
    metadata: &ExportMetadata<'_>,
) -> Result<(), CliError> {
    let file = File::create(path).map_err(|e| CliError::io(path, e))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "multibrot".to_string())?;
    encoder.add_text_chunk("Description".to_string(), metadata.description())?;
    for (key, value) in metadata.pairs(image) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&image.pixels)?;
    png_writer.finish()?;

    debug!(
        "Exported PNG {}x{} to {}",
        image.width,
        image.height,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use multibrot_render::Rgb;

    #[test]
    fn export_writes_pixels_and_metadata() {
        let mut image = RenderBuffer::new(3, 2);
        image.set_pixel(1, 0, Rgb::new(10, 20, 30));
        let theme = ThemeInfo::default();
        let metadata = ExportMetadata {
            region: PlaneRegion::default(),
            config: EvalConfig::default(),
            theme: &theme,
        };

        let dir = std::env::temp_dir().join("multibrot_test_export");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("render.png");
        export_png(&image, &path, &metadata).expect("export should succeed");

        let decoder = png::Decoder::new(File::open(&path).expect("file should exist"));
        let mut reader = decoder.read_info().expect("valid PNG header");
        let info = reader.info();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        let theme_chunk = info
            .uncompressed_latin1_text
            .iter()
            .find(|c| c.keyword == "Multibrot.Theme")
            .expect("theme chunk present");
        assert_eq!(theme_chunk.text, "Default");

        let mut buf = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut buf).expect("image data");
        assert_eq!(&buf[..image.pixels.len()], image.pixels.as_slice());
        assert_eq!(&buf[3..6], &[10, 20, 30]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let image = RenderBuffer::new(1, 1);
        let theme = ThemeInfo::default();
        let metadata = ExportMetadata {
            region: PlaneRegion::default(),
            config: EvalConfig::default(),
            theme: &theme,
        };
        let path = std::env::temp_dir()
            .join("multibrot_test_no_such_dir")
            .join("render.png");
        assert!(matches!(
            export_png(&image, &path, &metadata),
            Err(CliError::Io { .. })
        ));
    }
}
