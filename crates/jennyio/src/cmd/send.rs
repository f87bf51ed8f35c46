use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::time::Duration;

use jennyio_client::{connect, ChannelMultiplexer, StaticPage};
use jennyio_transport::EventReceiver;
use serde_json::Value;

use crate::cmd::{parse_duration, parse_page_url, shutdown, wait_for_open, SendArgs};
use crate::exit::{client_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_message, OutputFormat};

pub async fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let page_url = parse_page_url(&args.page)?;
    let timeout = parse_duration(&args.timeout)?;
    let payload = resolve_payload(&args)?;

    let (io, mut events) = connect(StaticPage::new(page_url))
        .map_err(|err| client_error("connect failed", err))?;
    wait_for_open(&io, &mut events, timeout).await?;

    let reply = Rc::new(RefCell::new(None::<Value>));
    if args.wait {
        let slot = reply.clone();
        io.subscribe(&args.channel, move |data| {
            slot.borrow_mut().get_or_insert(data);
        });
    }
    io.send(&args.channel, payload);

    if args.wait {
        let waited = wait_for_reply(&io, &mut events, &reply, timeout).await;
        io.unsubscribe(&args.channel);
        shutdown(&io, &mut events).await;
        return match waited {
            Some(data) => {
                print_message(&args.channel, &data, format);
                Ok(SUCCESS)
            }
            None => Err(CliError::new(
                TIMEOUT,
                format!("no reply on '{}' within {timeout:?}", args.channel),
            )),
        };
    }

    shutdown(&io, &mut events).await;
    Ok(SUCCESS)
}

async fn wait_for_reply(
    io: &ChannelMultiplexer,
    events: &mut EventReceiver,
    reply: &Rc<RefCell<Option<Value>>>,
    timeout: Duration,
) -> Option<Value> {
    let _ = tokio::time::timeout(timeout, async {
        while reply.borrow().is_none() {
            match events.recv().await {
                Some(event) => {
                    io.handle_event(event);
                }
                None => break,
            }
            if io.state().is_closed() {
                break;
            }
        }
    })
    .await;
    reply.borrow_mut().take()
}

fn resolve_payload(args: &SendArgs) -> CliResult<Value> {
    if let Some(json) = &args.json {
        return serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")));
    }
    if let Some(data) = &args.data {
        return Ok(Value::String(data.clone()));
    }
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return serde_json::from_str(&text).map_err(|err| {
            CliError::new(
                DATA_INVALID,
                format!("{} is not valid JSON: {err}", path.display()),
            )
        });
    }
    Ok(Value::Null)
}
