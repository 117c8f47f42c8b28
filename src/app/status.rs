use crate::channels::{Channel, TelegramChannel};
use crate::config::Config;
use crate::providers::{OpenAiProvider, Provider};

/// Show only enough of a credential to tell two apart.
fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

pub fn render_status(config: &Config) -> String {
    let max_exchanges = match config.session.max_exchanges {
        0 => "unbounded".to_string(),
        n => n.to_string(),
    };
    let lines = [
        "◆ gptrelay".to_string(),
        String::new(),
        format!("version        {}", env!("CARGO_PKG_VERSION")),
        format!("config         {}", config.config_path.display()),
        format!("log level      {}", config.log_level),
        String::new(),
        format!("openai token   {}", redact(&config.openai_token)),
        format!("telegram token {}", redact(&config.telegram_token)),
        format!("chat id        {}", config.chat_id),
        String::new(),
        format!("api base       {}", config.completion.api_base),
        format!("model          {}", config.completion.model),
        format!("temperature    {}", config.completion.temperature),
        format!("top_p          {}", config.completion.top_p),
        format!("max tokens     {}", config.completion.max_tokens),
        format!("timeout        {}s", config.completion.timeout_secs),
        format!("history cap    {max_exchanges}"),
        format!("telegram api   {}", config.telegram.api_base),
    ];
    lines.join("\n")
}

/// Probe both remote services with the configured credentials.
pub async fn render_online_checks(config: &Config) -> String {
    let provider = OpenAiProvider::with_base_url(
        Some(&config.openai_token),
        &config.completion.api_base,
        config.completion.http_timeout_secs(),
    );
    let completion = match provider.warmup().await {
        Ok(()) => "reachable".to_string(),
        Err(e) => format!("failed ({e:#})"),
    };

    let channel = TelegramChannel::new(config.telegram_token.clone(), &config.telegram);
    let telegram = match channel.identify().await {
        Ok(account) => format!("ok (@{account})"),
        Err(e) => format!("failed ({e:#})"),
    };

    [
        format!("completion     {completion}"),
        format!("telegram       {telegram}"),
    ]
    .join("\n")
}
