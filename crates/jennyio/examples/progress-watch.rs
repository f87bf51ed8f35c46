//! Watch a progress channel and print each update until the server closes.
//!
//! Run with:
//!   cargo run --example progress-watch -- http://localhost:9090/console jobs.export

use std::error::Error;

use jennyio::client::{connect, StaticPage};
use url::Url;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let page = args
        .next()
        .unwrap_or_else(|| "http://localhost:9090/".to_string());
    let channel = args.next().unwrap_or_else(|| "jobs".to_string());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let page = StaticPage::new(Url::parse(&page)?)
            .with_reload_hook(|url| eprintln!("[page] reload requested for {url}"));
        let (io, mut events) = connect(page)?;

        io.on_ready(move |io| {
            eprintln!("[client] connected, watching '{channel}'");
            let name = channel.clone();
            io.subscribe(&channel, move |data| {
                let percent = data.get("val").and_then(|val| val.as_u64()).unwrap_or(0);
                eprintln!("[{name}] {percent}% {data}");
            });
        });

        io.run(&mut events).await;
        eprintln!("[client] connection closed");
        Ok::<(), Box<dyn Error>>(())
    })
}
