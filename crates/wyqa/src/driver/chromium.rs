//! Chromium DevTools Protocol driver.
//!
//! Owns a private tokio runtime and blocks on every CDP call, bounded by the
//! timeouts in [`LaunchOptions`].

use super::{
    ColorScheme, ConsoleLevel, EventLog, LaunchOptions, Launcher, LogEvent, PageDriver, Script,
};
use crate::result::{HarnessError, HarnessResult};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    MediaFeature, SetDeviceMetricsOverrideParams, SetEmulatedMediaParams,
};
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EvaluateParams, EventConsoleApiCalled, EventExceptionThrown,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Launches headless (or headed) Chromium
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    /// Create a launcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Launcher for ChromiumLauncher {
    fn launch(&self, options: &LaunchOptions) -> HarnessResult<Box<dyn PageDriver>> {
        Ok(Box::new(ChromiumPage::launch(options)?))
    }
}

fn environment(e: impl ToString) -> HarnessError {
    HarnessError::Environment {
        message: e.to_string(),
    }
}

/// One browser with one page
pub struct ChromiumPage {
    runtime: Runtime,
    browser: Option<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    options: LaunchOptions,
    url: String,
}

impl std::fmt::Debug for ChromiumPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumPage")
            .field("url", &self.url)
            .field("open", &self.browser.is_some())
            .finish_non_exhaustive()
    }
}

impl ChromiumPage {
    /// Start the browser and open a blank page with the requested viewport
    pub fn launch(options: &LaunchOptions) -> HarnessResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(environment)?;

        let mut builder = BrowserConfig::builder()
            .window_size(options.viewport.width, options.viewport.height);
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(environment)?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(config).await.map_err(environment)?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!("cdp handler: {e}");
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(environment)?;
            page.execute(SetDeviceMetricsOverrideParams::new(
                i64::from(options.viewport.width),
                i64::from(options.viewport.height),
                1.0,
                false,
            ))
            .await
            .map_err(environment)?;

            Ok::<_, HarnessError>((browser, page, handle))
        })?;

        tracing::info!(
            width = options.viewport.width,
            height = options.viewport.height,
            headless = options.headless,
            "browser launched"
        );

        Ok(Self {
            runtime,
            browser: Some(browser),
            page,
            handler,
            options: options.clone(),
            url: String::from("about:blank"),
        })
    }

    fn block<T>(
        &self,
        limit: Duration,
        fut: impl Future<Output = HarnessResult<T>>,
    ) -> HarnessResult<T> {
        self.runtime.block_on(async {
            tokio::time::timeout(limit, fut)
                .await
                .unwrap_or(Err(HarnessError::Timeout {
                    ms: limit.as_millis() as u64,
                }))
        })
    }
}

fn console_text(event: &EventConsoleApiCalled) -> String {
    event
        .args
        .iter()
        .filter_map(|arg| {
            arg.value
                .as_ref()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .or_else(|| arg.description.clone())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl PageDriver for ChromiumPage {
    fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        let page = &self.page;
        let nav = |e: chromiumoxide::error::CdpError| HarnessError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };
        self.block(self.options.navigation_timeout, async {
            page.goto(url).await.map_err(nav)?;
            page.wait_for_navigation().await.map_err(nav)?;
            Ok(())
        })
        .map_err(|e| match e {
            HarnessError::Timeout { ms } => HarnessError::Navigation {
                url: url.to_string(),
                message: format!("page did not load within {ms}ms"),
            },
            other => other,
        })?;
        url.clone_into(&mut self.url);
        Ok(())
    }

    fn evaluate(&mut self, script: &Script) -> HarnessResult<serde_json::Value> {
        let label = script.label();
        tracing::debug!(probe = label, "evaluate");
        let params = EvaluateParams::builder()
            .expression(script.source.clone())
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| HarnessError::evaluation(label, e))?;
        let page = &self.page;
        self.block(self.options.eval_timeout, async {
            let result = page
                .evaluate_expression(params)
                .await
                .map_err(|e| HarnessError::evaluation(label, e.to_string()))?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        })
    }

    fn set_color_scheme(&mut self, scheme: ColorScheme) -> HarnessResult<()> {
        let mut params = SetEmulatedMediaParams::default();
        params.features = Some(vec![MediaFeature::new(
            "prefers-color-scheme",
            scheme.as_str(),
        )]);
        let page = &self.page;
        self.block(self.options.eval_timeout, async {
            page.execute(params)
                .await
                .map_err(|e| HarnessError::evaluation("colorScheme", e.to_string()))?;
            Ok(())
        })
    }

    fn screenshot(&mut self, path: &Path, full_page: bool) -> HarnessResult<()> {
        let page = &self.page;
        let params = ScreenshotParams::builder().full_page(full_page).build();
        self.block(self.options.navigation_timeout, async {
            page.save_screenshot(params, path)
                .await
                .map_err(|e| HarnessError::Screenshot {
                    message: e.to_string(),
                })?;
            Ok(())
        })?;
        tracing::debug!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    fn reload(&mut self) -> HarnessResult<()> {
        let page = &self.page;
        let url = self.url.clone();
        self.block(self.options.navigation_timeout, async {
            page.reload().await.map_err(|e| HarnessError::Navigation {
                url: url.clone(),
                message: e.to_string(),
            })?;
            Ok(())
        })
    }

    fn reload_collecting(&mut self, settle: Duration) -> HarnessResult<EventLog> {
        let page = &self.page;
        let url = self.url.clone();
        let limit = self.options.navigation_timeout + settle;
        let events: Arc<Mutex<Vec<LogEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let cdp = |e: chromiumoxide::error::CdpError| HarnessError::Navigation {
            url: url.clone(),
            message: e.to_string(),
        };

        let listeners = self.block(self.options.eval_timeout, async {
            let mut console = page
                .event_listener::<EventConsoleApiCalled>()
                .await
                .map_err(cdp)?;
            let mut exceptions = page
                .event_listener::<EventExceptionThrown>()
                .await
                .map_err(cdp)?;
            let mut responses = page
                .event_listener::<EventResponseReceived>()
                .await
                .map_err(cdp)?;

            let sink = Arc::clone(&events);
            let console_task = tokio::spawn(async move {
                while let Some(event) = console.next().await {
                    let level = match event.r#type {
                        ConsoleApiCalledType::Error => ConsoleLevel::Error,
                        ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
                        _ => ConsoleLevel::Other,
                    };
                    if let Ok(mut log) = sink.lock() {
                        log.push(LogEvent::Console {
                            level,
                            text: console_text(&event),
                        });
                    }
                }
            });

            let sink = Arc::clone(&events);
            let exception_task = tokio::spawn(async move {
                while let Some(event) = exceptions.next().await {
                    let details = &event.exception_details;
                    let text = details
                        .exception
                        .as_ref()
                        .and_then(|e| e.description.clone())
                        .unwrap_or_else(|| details.text.clone());
                    if let Ok(mut log) = sink.lock() {
                        log.push(LogEvent::Console {
                            level: ConsoleLevel::Error,
                            text,
                        });
                    }
                }
            });

            let sink = Arc::clone(&events);
            let response_task = tokio::spawn(async move {
                while let Some(event) = responses.next().await {
                    let status = u16::try_from(event.response.status).unwrap_or(0);
                    if let Ok(mut log) = sink.lock() {
                        log.push(LogEvent::Response {
                            url: event.response.url.clone(),
                            status,
                        });
                    }
                }
            });

            Ok(vec![console_task, exception_task, response_task])
        })?;

        let reloaded = self.block(limit, async {
            page.reload().await.map_err(cdp)?;
            tokio::time::sleep(settle).await;
            Ok(())
        });

        for task in &listeners {
            task.abort();
        }
        reloaded?;

        let drained = events
            .lock()
            .map(|mut log| std::mem::take(&mut *log))
            .unwrap_or_default();
        tracing::debug!(events = drained.len(), "reload log drained");
        Ok(drained.into_iter().collect())
    }

    fn press_key(&mut self, key: &str) -> HarnessResult<()> {
        let page = &self.page;
        self.block(self.options.eval_timeout, async {
            let body = page
                .find_element("body")
                .await
                .map_err(|e| HarnessError::input(e.to_string()))?;
            body.press_key(key)
                .await
                .map_err(|e| HarnessError::input(e.to_string()))?;
            Ok(())
        })
    }

    fn click(&mut self, selector: &str) -> HarnessResult<()> {
        let page = &self.page;
        self.block(self.options.eval_timeout, async {
            let element = page
                .find_element(selector)
                .await
                .map_err(|e| HarnessError::input(format!("{selector}: {e}")))?;
            element
                .click()
                .await
                .map_err(|e| HarnessError::input(format!("{selector}: {e}")))?;
            Ok(())
        })
    }

    fn pause(&mut self, duration: Duration) {
        self.runtime.block_on(tokio::time::sleep(duration));
    }

    fn close(&mut self) -> HarnessResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let result = self.runtime.block_on(async {
            browser.close().await.map_err(environment)?;
            browser.wait().await.map_err(environment)?;
            Ok::<_, HarnessError>(())
        });
        self.handler.abort();
        tracing::info!("browser closed");
        result
    }
}
