//! Theme set I/O: a JSON array of theme definitions.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use multibrot_render::{AddOutcome, ThemeInfo, ThemeRegistry};

use crate::error::CliError;

/// Read a theme list. Missing fields take their defaults and unrecognized
/// theme or palette kinds load as `Unknown`.
pub fn load(path: &Path) -> Result<Vec<ThemeInfo>, CliError> {
    let json = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let infos: Vec<ThemeInfo> =
        serde_json::from_str(&json).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {} theme(s) from {}", infos.len(), path.display());
    Ok(infos)
}

/// Add every theme from `path` to `registry`, replacing same-named ones.
pub fn merge_into(registry: &mut ThemeRegistry, path: &Path) -> Result<(), CliError> {
    let mut added = 0;
    let mut updated = 0;
    for info in load(path)? {
        match registry.add_or_update(info) {
            AddOutcome::Inserted => added += 1,
            AddOutcome::Updated => updated += 1,
        }
    }
    info!(added, updated, "Merged themes from {}", path.display());
    Ok(())
}

/// Write the registry's themes, in display order, as pretty-printed JSON.
pub fn save(path: &Path, registry: &ThemeRegistry) -> Result<(), CliError> {
    let infos: Vec<&ThemeInfo> = registry.infos().collect();
    let json = serde_json::to_string_pretty(&infos).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|e| CliError::io(path, e))?;
    info!("Saved {} theme(s) to {}", infos.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use multibrot_render::{PaletteKind, ThemeKind};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("multibrot_test_{name}"));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn save_then_merge_restores_themes() {
        let dir = temp_dir("themes_round_trip");
        let path = dir.join("themes.json");

        let mut source = ThemeRegistry::new();
        source.add_or_update(ThemeInfo {
            name: "Sunset".into(),
            theme_kind: ThemeKind::Continuous,
            palette_kind: PaletteKind::Exponential,
            n_colors: 256,
            ..ThemeInfo::default()
        });
        save(&path, &source).expect("save should succeed");

        let mut target = ThemeRegistry::new();
        merge_into(&mut target, &path).expect("merge should succeed");
        assert_eq!(target.len(), 3);
        assert_eq!(
            target.get("Sunset").unwrap().info(),
            source.get("Sunset").unwrap().info()
        );
        // Merging only adds: the selection is untouched.
        assert_eq!(target.current_name(), ThemeRegistry::BLACK_AND_WHITE);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn partial_definitions_take_defaults() {
        let dir = temp_dir("themes_partial");
        let path = dir.join("themes.json");
        fs::write(&path, r#"[{ "name": "Bare" }]"#).unwrap();

        let infos = load(&path).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "Bare");
        assert_eq!(infos[0].n_colors, ThemeInfo::DEFAULT_N_COLORS);
        assert_eq!(infos[0].theme_kind, ThemeKind::BiColor);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = temp_dir("themes_malformed");
        let path = dir.join("themes.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load(&path), Err(CliError::Json { .. })));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = temp_dir("themes_missing").join("does_not_exist.json");
        assert!(matches!(load(&path), Err(CliError::Io { .. })));
    }
}
