use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use streamrelay::application::usecases::{
    DispatchEventUseCase, PollDonationsUseCase, RedeemChannelPointsUseCase,
};
use streamrelay::application::{CooldownGate, Host};
use streamrelay::domain::CooldownPolicy;
use streamrelay::infrastructure::{
    console_host::ConsoleHost,
    event_bus::EventBus,
    memory_store::{InMemoryRuleStore, InMemorySeenStore},
    multi_host::MultiHost,
    streamlabs_provider::StreamlabsDonationSource,
    webhook_host::WebhookHost,
};
use streamrelay::interfaces::config::Config;
use streamrelay::interfaces::http_api::{ApiState, build_router};

#[derive(Parser, Debug)]
#[command(name = "streamrelay")]
struct Args {
    /// Path to config.yaml
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Poll the donation feed once and exit
    #[arg(long)]
    once: bool,

    /// Do not forward actions to the host webhook (console only)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("streamrelay=info".parse().unwrap()),
        )
        .init();
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }
    let args = Args::parse();

    // 1) load config
    let cfg = match Config::load_from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // 2) rules + cooldowns
    let rules = InMemoryRuleStore::from_raw(&cfg.actions);
    tracing::info!(
        event_keys = cfg.actions.len(),
        rules = rules.rule_count(),
        "action rules loaded"
    );
    let cooldowns = CooldownGate::new(CooldownPolicy::new(cfg.cooldowns.clone()));

    // 3) host fanout
    let mut hosts: Vec<Box<dyn Host>> = vec![Box::new(ConsoleHost::new())];
    if !args.dry_run {
        match &cfg.host.webhook_url {
            Some(url) => match WebhookHost::new(url.clone(), cfg.host_timeout()) {
                Ok(h) => hosts.push(Box::new(h)),
                Err(e) => {
                    tracing::error!("Failed to build webhook host: {e}");
                    std::process::exit(1);
                }
            },
            None => tracing::warn!("host.webhook_url not set, actions only go to the console"),
        }
    } else {
        tracing::warn!("--dry-run enabled: only console output");
    }

    let bus = EventBus::new(256);
    let dispatch = Arc::new(DispatchEventUseCase {
        rules: Arc::new(rules),
        cooldowns: Arc::new(cooldowns),
        host: Arc::new(MultiHost::new(hosts)),
        publisher: Some(Arc::new(bus.clone())),
    });

    // 4) donation poller
    let source = match StreamlabsDonationSource::new(
        cfg.streamlabs.url.clone(),
        cfg.streamlabs.access_token.clone(),
        cfg.fetch_timeout(),
    ) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to build donation source: {e}");
            std::process::exit(1);
        }
    };
    let poller = Arc::new(
        PollDonationsUseCase::new(
            Arc::new(source),
            Arc::new(InMemorySeenStore::new(cfg.streamlabs.seen_capacity)),
            dispatch.clone(),
        )
        .with_skip_backlog(cfg.effective_skip_backlog(args.once)),
    );

    if args.once {
        match poller.execute().await {
            Ok(report) => tracing::info!(?report, "poll once completed"),
            Err(e) => {
                tracing::error!("Poll failed: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let token = CancellationToken::new();
    let mut tasks = Vec::new();

    let poll_interval = cfg.poll_interval();
    tracing::info!(poll_interval_ms = poll_interval.as_millis() as u64, "polling started");
    {
        let poller = poller.clone();
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            poller.run(poll_interval, token).await;
        }));
    }

    // 5) push ingress
    if let Some(http) = &cfg.http {
        let redeem = Arc::new(RedeemChannelPointsUseCase {
            dispatch: dispatch.clone(),
            channel_id: cfg.twitch.channel_id.clone(),
        });
        let router = build_router(ApiState {
            redeem,
            api_token: http.api_token.clone(),
            event_bus: Some(bus.clone()),
            shutdown: token.clone(),
        });

        let listener = match tokio::net::TcpListener::bind(&http.bind).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("Failed to bind {}: {e}", http.bind);
                std::process::exit(1);
            }
        };
        tracing::info!(
            bind = %http.bind,
            channel = cfg.twitch.channel_name.as_deref().unwrap_or("-"),
            "redemption ingress listening"
        );

        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!("http server failed: {e}");
            }
        }));
    } else {
        tracing::warn!("http not configured, channel points ingress disabled");
    }

    // 6) run until ctrl-c
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
    token.cancel();

    for t in tasks {
        let _ = t.await;
    }
    tracing::info!("streamrelay stopped");
}
