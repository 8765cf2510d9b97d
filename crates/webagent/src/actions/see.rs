//! SEE handler: screenshot a URL with a headless browser

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::{debug, warn};
use webagent_core::ImageAttachment;

use super::{ActionKind, ActionOutcome};

const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Renders a page to PNG bytes
#[async_trait]
pub trait PageCapture: Send + Sync {
    async fn capture(&self, url: &str) -> Result<Vec<u8>>;
}

/// Headless Chrome, one browser per capture
#[derive(Debug, Clone, Default)]
pub struct ChromeCapture;

impl ChromeCapture {
    pub fn new() -> Self {
        Self
    }

    fn config() -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid browser configuration: {}", e))
    }
}

#[async_trait]
impl PageCapture for ChromeCapture {
    async fn capture(&self, url: &str) -> Result<Vec<u8>> {
        let (mut browser, mut handler) = Browser::launch(Self::config()?)
            .await
            .context("Failed to launch headless browser")?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser event error");
                }
            }
        });

        let shot = screenshot(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "Browser did not exit cleanly");
        }
        events.abort();

        shot
    }
}

async fn screenshot(browser: &Browser, url: &str) -> Result<Vec<u8>> {
    let page = browser
        .new_page(url)
        .await
        .with_context(|| format!("Failed to open {}", url))?;
    page.wait_for_navigation()
        .await
        .with_context(|| format!("Failed to load {}", url))?;

    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .build();
    page.screenshot(params)
        .await
        .with_context(|| format!("Failed to capture {}", url))
}

/// Screenshot `url` and attach it to the outcome
pub(super) async fn see(capture: &dyn PageCapture, url: &str) -> Result<ActionOutcome> {
    let png = capture.capture(url).await?;
    debug!(url, bytes = png.len(), "Captured screenshot");

    Ok(ActionOutcome::done(
        ActionKind::See,
        url,
        format!("Here is the screenshot of the URL: {}", url),
    )
    .with_image(ImageAttachment::Png(png)))
}
