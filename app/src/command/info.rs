use gmpa_config::{CLIENT_ID_ENV, CLIENT_SECRET_ENV, Config};

/// Strategy for displaying configuration information.
///
/// Outputs the Interact connection settings (credentials masked), the bot
/// used by each step and the analysis options.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== gmpa Configuration ===\n");

        println!("Interact:");
        println!("  Base URL: {}", config.interact.base_url());
        println!("  Token Path: {}", config.interact.token_path);
        println!("  Application ID: {}", config.interact.application_id);
        println!("  Client ID: {}", mask(&config.interact.client_id));
        println!("  Client Secret: {}", mask(&config.interact.client_secret));
        println!("  (overridable via {CLIENT_ID_ENV} / {CLIENT_SECRET_ENV})");
        println!();

        println!("Bots:");
        println!("  Category Summary: {}", config.bots.category_summary);
        println!("  Bullet Summary: {}", config.bots.bullet_summary);
        println!("  Maturity Gaps: {}", config.bots.maturity_gaps);
        println!();

        println!("Analysis:");
        println!("  Preview Rows: {}", config.analysis.preview_rows);
        println!("  Driver Limit: {}", config.analysis.driver_limit);
        match &config.analysis.catalog_path {
            Some(path) => println!("  Catalog: {}", path.display()),
            None => println!("  Catalog: (built-in)"),
        }

        Ok(())
    }
}

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::mask;

    #[test]
    fn masks_by_length() {
        assert_eq!(mask(""), "(not set)");
        assert_eq!(mask("short"), "***");
        assert_eq!(mask("abcd1234wxyz"), "abcd...wxyz");
    }
}
