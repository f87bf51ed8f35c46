use std::cell::Cell;
use std::rc::Rc;

use jennyio_client::{connect, StaticPage};
use tracing::info;

use crate::cmd::{parse_duration, parse_page_url, shutdown, wait_for_open, ListenArgs};
use crate::exit::{client_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_event, print_message, OutputFormat};

pub async fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let page_url = parse_page_url(&args.page)?;
    let timeout = parse_duration(&args.timeout)?;

    let page = StaticPage::new(page_url)
        .with_reload_hook(move |url| print_event("reload", url.as_str(), format));
    let (io, mut events) = connect(page).map_err(|err| client_error("connect failed", err))?;
    let io = Rc::new(io);

    let received = Rc::new(Cell::new(0usize));
    let channels = args.channels.clone();
    let count = args.count;
    let weak = Rc::downgrade(&io);
    let counter = received.clone();
    io.on_ready(move |io| {
        for channel in channels {
            let name = channel.clone();
            let counter = counter.clone();
            let weak = weak.clone();
            io.subscribe(&channel, move |data| {
                print_message(&name, &data, format);
                counter.set(counter.get().saturating_add(1));
                if count.is_some_and(|limit| counter.get() >= limit) {
                    if let Some(io) = weak.upgrade() {
                        io.close();
                    }
                }
            });
        }
    });

    wait_for_open(&io, &mut events, timeout).await?;
    info!(channels = ?args.channels, "listening");

    let interrupted = tokio::select! {
        _ = io.run(&mut events) => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        info!("interrupted");
        shutdown(&io, &mut events).await;
        return Ok(SUCCESS);
    }

    print_event("closed", &format!("{} message(s) received", received.get()), format);
    match count {
        Some(limit) if received.get() < limit => Ok(FAILURE),
        _ => Ok(SUCCESS),
    }
}
