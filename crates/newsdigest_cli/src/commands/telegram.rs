use newsdigest::publish::PublishError;
use newsdigest::TelegramPublisher;

use crate::TelegramAction;
use crate::config::{Config, TELEGRAM_BOT_TOKEN};

pub(crate) async fn handle_telegram(
    action: TelegramAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TelegramAction::ChatId => {
            let Some(token) = config.telegram_bot_token() else {
                return Err(format!("{TELEGRAM_BOT_TOKEN} is not set").into());
            };
            // The chat id is what we are looking for, so none is configured.
            let publisher = TelegramPublisher::new(token, "", config.telegram_options())?;

            match publisher.discover_chat_id().await {
                Ok(chat) => {
                    println!("Chat ID: {}", chat.id);
                    println!("Chat type: {}", chat.kind);
                    println!("Chat title: {}", chat.title);
                    println!();
                    println!("Add this to your .env file:");
                    println!("{}={}", crate::config::TELEGRAM_CHAT_ID, chat.id);
                }
                Err(PublishError::NoUpdates) => {
                    println!("No messages found. Please:");
                    println!("1. Add the bot to your group/channel, or message it directly");
                    println!("2. Send a message");
                    println!("3. Run this command again");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
