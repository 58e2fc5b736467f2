//! Scene library.
//!
//! Every stage is backed by one HTML template stored under `<stage>.html`.
//! The built-in defaults are written on first start and never overwritten,
//! so an operator can edit the files in place.

use std::sync::Arc;

use heartheist_storage::StorageBackend;

use crate::error::SceneError;
use crate::stage::Stage;

const VAULT: &str = include_str!("defaults/vault.html");
const PUZZLE: &str = include_str!("defaults/puzzle.html");
const RAIN: &str = include_str!("defaults/rain.html");
const FINALE: &str = include_str!("defaults/finale.html");

/// Storage key for a stage's template.
#[must_use]
pub fn key_for(stage: Stage) -> String {
    format!("{}.html", stage.as_str())
}

/// The built-in template for a stage.
#[must_use]
pub fn default_template(stage: Stage) -> &'static str {
    match stage {
        Stage::Vault => VAULT,
        Stage::Puzzle => PUZZLE,
        Stage::Rain => RAIN,
        Stage::Finale => FINALE,
    }
}

/// Stage templates on top of a storage backend.
#[derive(Clone)]
pub struct SceneLibrary {
    storage: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for SceneLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneLibrary").finish_non_exhaustive()
    }
}

impl SceneLibrary {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Write the built-in template for every stage whose file is missing.
    ///
    /// Existing files are left untouched. Returns the keys that were created.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Storage`] if the backend cannot be read or written.
    pub async fn ensure_defaults(&self) -> Result<Vec<String>, SceneError> {
        let mut created = Vec::new();
        for stage in Stage::ALL {
            let key = key_for(stage);
            if self.storage.exists(&key).await? {
                continue;
            }
            self.storage
                .put(&key, default_template(stage).as_bytes())
                .await?;
            tracing::info!(scene = %key, "created default stage template");
            created.push(key);
        }
        Ok(created)
    }

    /// Read a stage's template text.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NotFound`] if the file does not exist.
    /// - [`SceneError::InvalidEncoding`] if it is not UTF-8.
    /// - [`SceneError::Storage`] if the backend fails.
    pub async fn load(&self, stage: Stage) -> Result<String, SceneError> {
        let key = key_for(stage);
        let bytes = self
            .storage
            .get(&key)
            .await?
            .ok_or_else(|| SceneError::NotFound { key: key.clone() })?;
        String::from_utf8(bytes).map_err(|_| SceneError::InvalidEncoding { key })
    }

    /// Template keys currently present in storage.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Storage`] if the backend cannot list keys.
    pub async fn installed(&self) -> Result<Vec<String>, SceneError> {
        let keys = self.storage.list("").await?;
        Ok(keys.into_iter().filter(|k| k.ends_with(".html")).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use heartheist_storage::MemoryBackend;

    use super::*;
    use crate::template::Template;

    fn library() -> (SceneLibrary, Arc<MemoryBackend>) {
        let storage = Arc::new(MemoryBackend::new());
        (SceneLibrary::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn ensure_defaults_creates_every_stage_once() {
        let (lib, _) = library();
        let created = lib.ensure_defaults().await.unwrap();
        assert_eq!(
            created,
            ["vault.html", "puzzle.html", "rain.html", "finale.html"]
        );
        assert!(lib.ensure_defaults().await.unwrap().is_empty());
        assert_eq!(lib.installed().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn ensure_defaults_never_overwrites() {
        let (lib, storage) = library();
        storage.put("rain.html", b"custom rain").await.unwrap();

        let created = lib.ensure_defaults().await.unwrap();
        assert!(!created.contains(&"rain.html".to_owned()));
        assert_eq!(lib.load(Stage::Rain).await.unwrap(), "custom rain");
    }

    #[tokio::test]
    async fn missing_scene_is_not_found() {
        let (lib, _) = library();
        let err = lib.load(Stage::Finale).await.unwrap_err();
        assert!(matches!(err, SceneError::NotFound { ref key } if key == "finale.html"));
        assert_eq!(err.to_string(), "stage template not found: finale.html");
    }

    #[tokio::test]
    async fn non_utf8_scene_is_rejected() {
        let (lib, storage) = library();
        storage.put("vault.html", &[0xFF, 0xFE, 0x00]).await.unwrap();
        let err = lib.load(Stage::Vault).await.unwrap_err();
        assert!(matches!(err, SceneError::InvalidEncoding { .. }));
    }

    #[test]
    fn default_templates_parse() {
        for stage in Stage::ALL {
            let template = Template::parse(default_template(stage)).unwrap();
            assert!(
                template.placeholders().contains(&"ACCENT"),
                "{stage} should use the accent color"
            );
        }
    }

    #[test]
    fn defaults_use_only_known_placeholders() {
        let known = [
            "ACCENT",
            "POEM_WORDS",
            "COMPLIMENTS",
            "PHOTO_A",
            "PHOTO_B",
            "RECIPIENT",
            "SENDER",
            "DATE_HUMAN",
            "ICS_URI",
            "FREE_TEXT",
            "COMPAT_SCORE",
            "BACKGROUND",
            "AUDIO_URL",
        ];
        for stage in Stage::ALL {
            let template = Template::parse(default_template(stage)).unwrap();
            for name in template.placeholders() {
                assert!(known.contains(&name), "{stage} uses unknown {name}");
            }
        }
    }

    #[test]
    fn finale_download_uses_attribute_escaping() {
        assert!(FINALE.contains(r#"download="valentine_{{RECIPIENT|attr}}.ics""#));
        assert!(FINALE.contains(r#"href="{{ICS_URI|uri}}""#));
    }
}
