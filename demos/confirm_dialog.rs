//! Example: awaiting a confirm dialog.
//!
//! A task plays the host UI: it redraws on every lifecycle event and answers
//! the dialog the way a user pressing "y" would.

use futures::StreamExt;
use overstack::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let overlays = Orchestrator::<bool, String>::builder()
        .view(view_fn("confirm", |view: &ViewProps<bool, String>| {
            let question = view.props.get_str("question").unwrap_or("Continue");
            view.visible.then(|| format!("{question}? [y/n]"))
        }))
        .config(OverlayConfig::new().with_grace_delay_ms(150))
        .build()?;

    let mut events = overlays.subscribe();
    let host = overlays.clone();
    let ui = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            println!("event: {event:?}");
            for view in host.frame() {
                match view.draw() {
                    Some(text) => println!("  draw {}: {text}", view.token()),
                    None => println!("  draw {}: (hidden)", view.token()),
                }
                if view.visible() {
                    view.resolve(true);
                }
            }
            if matches!(event, OverlayEvent::Popped { .. }) && host.is_empty() {
                break;
            }
        }
    });

    let mut binding = overlays.bind("confirm", Props::new().with("question", "Delete 3 files"));
    binding.sync(Props::new().with("question", "Delete 4 files"));

    match binding.trigger(Props::new()).await {
        Ok(true) => println!("confirmed"),
        Ok(false) => println!("declined"),
        Err(err) => println!("dialog failed: {err}"),
    }

    if let Err(err) = ui.await {
        println!("host task failed: {err}");
        return Err(err.into());
    }
    Ok(())
}
