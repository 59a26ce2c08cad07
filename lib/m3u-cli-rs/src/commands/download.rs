use crate::Config;
use anyhow::bail;
use anyhow::ensure;
use anyhow::Context;
use m3u::CancellationToken;
use m3u::ContentResolver;
use m3u::DownloadMessage;
use m3u::DownloadOutcome;
use m3u::Resource;
use m3u::Stream;
use m3u::UrlAddress;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Debug, argh::FromArgs)]
#[argh(
    subcommand,
    name = "download",
    description = "download a stream into a single file"
)]
pub struct Options {
    #[argh(positional, description = "the url of the playlist or stream")]
    pub url: UrlAddress,

    #[argh(
        option,
        short = 'o',
        description = "the file to append the stream to. Defaults to the manifest name with a \".ts\" extension."
    )]
    pub output: Option<PathBuf>,

    #[argh(
        option,
        description = "the 1-based index of the playlist stream to download. Defaults to the highest resolution."
    )]
    pub stream: Option<NonZeroUsize>,
}

pub async fn exec(
    resolver: &ContentResolver<reqwest::Client>,
    config: &Config,
    options: Options,
) -> anyhow::Result<()> {
    println!("Fetching manifest...");
    let resource = resolver
        .resolve(&options.url)
        .await
        .with_context(|| format!("failed to resolve \"{}\"", options.url))?;

    let mut stream = match resource {
        Resource::Playlist(playlist) => {
            let count = playlist.streams().len();
            let index = match options.stream {
                Some(n) => n.get() - 1,
                None => playlist
                    .best_stream_index()
                    .ok_or(m3u::Error::NoValidStream)?,
            };
            let stream = playlist
                .into_streams()
                .into_iter()
                .nth(index)
                .with_context(|| {
                    format!(
                        "stream {} does not exist, the playlist has {count} streams",
                        index + 1
                    )
                })?;

            println!(
                "Selected Stream: resolution={}, url={}",
                stream.resolution(),
                stream.url()
            );

            stream
        }
        Resource::Stream(stream) => {
            if options.stream.is_some() {
                warn!("ignoring stream index, \"{}\" is not a playlist", options.url);
            }
            stream
        }
        Resource::Segment(segment) => {
            bail!("\"{}\" is a media segment, not a manifest", segment.url());
        }
    };

    if stream.segments().is_empty() {
        println!("Fetching stream...");
        stream
            .reload(resolver.fetcher())
            .await
            .with_context(|| format!("failed to reload \"{}\"", stream.url()))?;
    }
    ensure!(
        !stream.segments().is_empty(),
        "the stream \"{}\" has no segments",
        stream.url()
    );

    let out_path = output_path(config, &options);
    println!(
        "{} segments will be appended to \"{}\"",
        stream.segments().len(),
        out_path.display()
    );

    let outcome = download_stream(resolver, &stream, &out_path).await?;
    if outcome == DownloadOutcome::Canceled {
        println!("The partial download was kept at \"{}\"", out_path.display());
    }

    Ok(())
}

/// Download a stream, appending it to the file at the given path.
///
/// Ctrl+C cancels the download after the current segment.
async fn download_stream(
    resolver: &ContentResolver<reqwest::Client>,
    stream: &Stream,
    out_path: &Path,
) -> anyhow::Result<DownloadOutcome> {
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(out_path)
        .await
        .with_context(|| format!("failed to open \"{}\"", out_path.display()))?;
    let mut file = tokio::io::BufWriter::new(file);

    let cancellation_token = CancellationToken::new();
    let ctrl_c_handle = tokio::spawn({
        let cancellation_token = cancellation_token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    cancellation_token.cancel();
                }
                Err(error) => {
                    warn!("failed to register ctrl+c handler: {error}");
                }
            }
        }
    });

    let total = stream.segments().len();
    let progress_bar = indicatif::ProgressBar::new(u64::try_from(total)?);
    let progress_bar_style_template =
        "[Time = {elapsed_precise} | ETA = {eta_precise}] {wide_bar} {pos}/{len} {msg}";
    let progress_bar_style = indicatif::ProgressStyle::default_bar()
        .template(progress_bar_style_template)
        .expect("invalid progress bar style template");
    progress_bar.set_style(progress_bar_style);

    let result = stream
        .download(
            resolver.fetcher(),
            &mut file,
            &cancellation_token,
            |message| match message {
                DownloadMessage::Progress { index, total, url } => {
                    progress_bar.inc(1);
                    progress_bar.set_message(format!("[{index}/{total}]: {url}"));
                }
                DownloadMessage::Complete { outcome } => {
                    progress_bar.finish_with_message(outcome.message());
                }
            },
        )
        .await;
    ctrl_c_handle.abort();

    if result.is_err() {
        progress_bar.abandon();
    }

    // Keep whatever segments were written before a failure.
    let shutdown_result = file.shutdown().await;
    let outcome = result.with_context(|| format!("failed to download \"{}\"", stream.url()))?;
    shutdown_result.with_context(|| format!("failed to close \"{}\"", out_path.display()))?;

    Ok(outcome)
}

fn output_path(config: &Config, options: &Options) -> PathBuf {
    let path = options
        .output
        .clone()
        .unwrap_or_else(|| default_file_name(&options.url));

    match config.output_directory.as_ref() {
        Some(output_directory) if path.is_relative() => output_directory.join(path),
        _ => path,
    }
}

/// Make a file name from the last segment of a url.
fn default_file_name(url: &UrlAddress) -> PathBuf {
    let path = url.as_str().split(['?', '#']).next().unwrap_or_default();
    let name = path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("stream");

    PathBuf::from(name).with_extension("ts")
}

#[cfg(test)]
mod test {
    use super::*;

    fn url(raw: &str) -> UrlAddress {
        UrlAddress::new(raw).expect("invalid url")
    }

    #[test]
    fn file_name_from_url() {
        assert!(default_file_name(&url("http://host/path/index.m3u8")) == PathBuf::from("index.ts"));
        assert!(
            default_file_name(&url("http://host/live/master.m3u8?token=abc"))
                == PathBuf::from("master.ts")
        );
        assert!(default_file_name(&url("http://host/path/")) == PathBuf::from("stream.ts"));
    }

    #[test]
    fn output_path_uses_output_directory() {
        let config = Config {
            output_directory: Some(PathBuf::from("downloads")),
            ..Config::default()
        };
        let options = Options {
            url: url("http://host/path/index.m3u8"),
            output: None,
            stream: None,
        };
        assert!(output_path(&config, &options) == PathBuf::from("downloads").join("index.ts"));

        let options = Options {
            output: Some(PathBuf::from("video.ts")),
            ..options
        };
        assert!(output_path(&config, &options) == PathBuf::from("downloads").join("video.ts"));
        assert!(output_path(&Config::default(), &options) == PathBuf::from("video.ts"));
    }
}
