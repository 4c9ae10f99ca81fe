use crate::cli::PrefsAction;
use crate::output;
use chrono::{NaiveDate, Utc};
use kanban_persistence::LocalPrefs;
use std::path::{Path, PathBuf};

/// Preferences live beside the tables file: `board.json` -> `board.prefs.json`.
pub fn prefs_path(file_path: &str) -> PathBuf {
    Path::new(file_path).with_extension("prefs.json")
}

pub async fn handle(path: &Path, action: PrefsAction) -> anyhow::Result<()> {
    let mut prefs = LocalPrefs::load(path).await?;

    match action {
        PrefsAction::Show => {}
        PrefsAction::Permission { value } => {
            prefs.set_notification_permission(&value).await?;
        }
        PrefsAction::Notified { date } => {
            let date = match date {
                Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| anyhow::anyhow!("Invalid date '{}': use YYYY-MM-DD", raw))?,
                None => Utc::now().date_naive(),
            };
            prefs.set_last_daily_notification(date).await?;
        }
    }

    output::output_success(serde_json::json!({
        "notification_permission": prefs.notification_permission(),
        "last_daily_notification": prefs
            .last_daily_notification()
            .map(|date| date.format("%Y-%m-%d").to_string()),
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefs_path_sits_beside_tables() {
        assert_eq!(
            prefs_path("/tmp/board.json"),
            PathBuf::from("/tmp/board.prefs.json")
        );
        assert_eq!(prefs_path("tables"), PathBuf::from("tables.prefs.json"));
    }
}
