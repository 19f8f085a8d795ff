//! libcurl-backed `HttpClient`.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::PodscrapeConfig;
use crate::progress::TransferProgress;
use crate::retry::TransferError;

use super::HttpClient;

/// Transfer limits applied to every request.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Total time allowed for one transfer.
    pub timeout: Duration,
    /// Abort when slower than `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self::from(&PodscrapeConfig::default())
    }
}

impl From<&PodscrapeConfig> for CurlOptions {
    fn from(cfg: &PodscrapeConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    options: CurlOptions,
}

impl CurlClient {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.timeout(self.options.timeout)?;
        easy.low_speed_limit(self.options.low_speed_limit)?;
        easy.low_speed_time(self.options.low_speed_time)?;
        if let Some(agent) = &self.options.user_agent {
            easy.useragent(agent)?;
        }
        Ok(easy)
    }
}

fn check_status(easy: &mut curl::easy::Easy) -> Result<(), TransferError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }
    Ok(())
}

impl HttpClient for CurlClient {
    fn get_text(&self, url: &str) -> Result<String, TransferError> {
        let mut easy = self.easy(url)?;
        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        check_status(&mut easy)?;
        String::from_utf8(body).map_err(|_| TransferError::Encoding)
    }

    fn download(
        &self,
        url: &str,
        out: &mut dyn Write,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<u64, TransferError> {
        let mut easy = self.easy(url)?;
        easy.progress(true)?;

        let mut written = 0u64;
        let mut write_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match out.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("audio write failed: {}", e);
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.progress_function(|dl_total, dl_now, _, _| {
                on_progress(TransferProgress {
                    bytes_done: dl_now as u64,
                    total_bytes: (dl_total > 0.0).then_some(dl_total as u64),
                });
                true
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(TransferError::Storage(e));
        }
        performed?;
        check_status(&mut easy)?;
        Ok(written)
    }
}
