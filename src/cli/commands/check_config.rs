//! Check config command handler

use crate::config::Config;

pub fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    println!("Configuration OK");
    println!("{:-<50}", "");
    println!("Database:        {}", config.general.database_path);
    println!("Port:            {}", config.server.port);
    println!("Public URL:      {}", config.server.public_url);
    println!(
        "Mail transport:  {}",
        if config.email.sendgrid_api_key.is_empty() {
            "log only"
        } else {
            "SendGrid"
        }
    );
    for (name, provider) in [("Google", &config.oauth.google), ("GitHub", &config.oauth.github)] {
        let label = format!("{name}:");
        println!(
            "{label:<17}{}",
            if provider.is_configured() {
                provider.callback_url.as_str()
            } else {
                "not configured"
            }
        );
    }
    println!(
        "Metrics:         {}",
        if config.observability.metrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(())
}
