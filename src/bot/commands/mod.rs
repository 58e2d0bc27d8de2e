pub mod create;
pub mod events;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Команды календарного бота:")]
pub enum Command {
    #[command(description = "Показать эту справку")]
    Help,
    #[command(description = "Начать работу и подключить календарь")]
    Start,
    #[command(description = "События на сегодня")]
    Today,
    #[command(description = "Ближайшее событие")]
    Next,
    #[command(description = "События на выбранную дату")]
    Date,
    #[command(description = "Создать событие")]
    Create,
}

/// Commands that show calendar contents and therefore ask for confirmation
/// before running in a group chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelCommand {
    Today,
    Next,
    Date,
}

impl TopLevelCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopLevelCommand::Today => "today",
            TopLevelCommand::Next => "next",
            TopLevelCommand::Date => "date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(TopLevelCommand::Today),
            "next" => Some(TopLevelCommand::Next),
            "date" => Some(TopLevelCommand::Date),
            _ => None,
        }
    }
}

/// Who issued a command, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInput {
    pub user_id: u64,
    pub chat_id: i64,
    pub chat_is_private: bool,
    pub message_id: i32,
}
