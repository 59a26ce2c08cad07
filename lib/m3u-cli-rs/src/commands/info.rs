use anyhow::Context;
use m3u::ContentResolver;
use m3u::Resource;
use m3u::UrlAddress;

#[derive(argh::FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "info")]
#[argh(description = "get information about a playlist or stream")]
pub struct Options {
    #[argh(positional, description = "the url of the playlist or stream")]
    pub url: UrlAddress,
}

pub async fn exec(
    resolver: &ContentResolver<reqwest::Client>,
    options: Options,
) -> anyhow::Result<()> {
    let resource = resolver
        .resolve(&options.url)
        .await
        .with_context(|| format!("failed to resolve \"{}\"", options.url))?;

    match resource {
        Resource::Playlist(playlist) => {
            println!("PLAYLIST:");
            println!("Duration: {}", playlist.target_duration().as_secs());
            println!("Streams Count: {}", playlist.streams().len());
            for (i, stream) in playlist.streams().iter().enumerate() {
                println!(
                    "  {}) resolution={}, url={}",
                    i + 1,
                    stream.resolution(),
                    stream.url()
                );
            }

            match playlist.select_best_stream() {
                Some(stream) => {
                    println!(
                        "Selected Stream: resolution={}, url={}",
                        stream.resolution(),
                        stream.url()
                    );
                }
                None => {
                    println!("WARNING: no stream found!");
                }
            }
        }
        Resource::Stream(stream) => {
            println!("STREAM:");
            println!("Duration: {}", stream.target_duration().as_secs());
            println!("Resolution: {}", stream.resolution());
            println!("Url: {}", stream.url());
            println!("Complete: {}", stream.is_complete());
            println!("Segments Count: {}", stream.segments().len());
        }
        Resource::Segment(segment) => {
            println!("SEGMENT:");
            println!("Url: {}", segment.url());
        }
    }

    Ok(())
}
