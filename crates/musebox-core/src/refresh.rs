//! Daily content refresh: pick a photo, generate a poem, persist the pair.
//! Runs once at startup and then on the daily schedule.

use crate::config::Config;
use crate::error::GalleryError;
use crate::gallery::Gallery;
use crate::poem::PoemClient;
use crate::state::DailyState;
use tracing::{error, info};

pub struct Refresher {
    gallery: Gallery,
    poem_client: PoemClient,
    config: Config,
}

impl Refresher {
    pub fn new(config: Config, poem_client: PoemClient) -> Self {
        Self {
            gallery: Gallery::new(config.paths.photo_dir.clone()),
            poem_client,
            config,
        }
    }

    /// Produce and persist a fresh [`DailyState`]. "Today" is recomputed on
    /// every call, never captured at startup. A failed state write is
    /// logged and the fresh state still returned, so the caller can display
    /// it; an empty photo directory is the one hard error.
    pub async fn run_once(&self) -> Result<DailyState, GalleryError> {
        let today = chrono::Local::now().date_naive();

        let photo_path = self.gallery.pick_random()?;
        let love_poetry = self.poem_client.generate(today).await;

        let state = DailyState {
            photo_path: photo_path.to_string_lossy().into_owned(),
            love_poetry,
        };

        if let Err(e) = state.save(&self.config.paths.state_file) {
            error!("[refresh] failed to persist daily state: {e:#}");
        } else {
            info!(
                "[refresh] daily state updated for {}: photo={}",
                today, state.photo_path
            );
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiConfig, Config};
    use crate::error::StateError;
    use crate::poem::FALLBACK_POEM;

    fn test_refresher(root: &std::path::Path, with_photo: bool) -> Refresher {
        let config = Config {
            paths: crate::config::PathsConfig {
                music_dir: root.join("music"),
                photo_dir: root.join("photo"),
                state_file: root.join("data.json"),
            },
            ai: AiConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                request_timeout_secs: 2,
                ..AiConfig::default()
            },
            ..Config::default()
        };
        std::fs::create_dir_all(&config.paths.photo_dir).unwrap();
        if with_photo {
            std::fs::write(config.paths.photo_dir.join("pic.jpg"), b"x").unwrap();
        }
        let poem_client = PoemClient::new(config.ai.clone(), Some("key".into())).unwrap();
        Refresher::new(config, poem_client)
    }

    #[tokio::test]
    async fn test_run_once_persists_state_with_fallback_poem() {
        let dir = tempfile::tempdir().unwrap();
        let refresher = test_refresher(dir.path(), true);

        let state = refresher.run_once().await.unwrap();
        assert!(state.photo_path.ends_with("pic.jpg"));
        assert_eq!(state.love_poetry, FALLBACK_POEM);

        let loaded = DailyState::load(&dir.path().join("data.json")).unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_run_once_empty_photo_dir() {
        let dir = tempfile::tempdir().unwrap();
        let refresher = test_refresher(dir.path(), false);

        assert!(matches!(
            refresher.run_once().await,
            Err(GalleryError::EmptyCollection)
        ));
        // Nothing persisted.
        assert!(matches!(
            DailyState::load(&dir.path().join("data.json")),
            Err(StateError::Missing)
        ));
    }
}
