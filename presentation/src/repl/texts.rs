//! Session message catalog for `/lang`.

use hydra_application::Language;

/// Fixed strings the REPL prints, per language.
#[derive(Debug, Clone, Copy)]
pub struct Texts {
    pub commands: &'static str,
    pub help: &'static [(&'static str, &'static str)],
    pub markers: &'static str,
    pub cancel_hint: &'static str,
    pub welcome_hint: &'static str,
    pub history_cleared: &'static str,
    pub auto_approve_on: &'static str,
    pub auto_approve_off: &'static str,
    pub language_switched: &'static str,
    pub unknown_command: &'static str,
    pub type_help: &'static str,
    pub request_cancelled: &'static str,
    pub no_calls: &'static str,
    pub memory_title: &'static str,
    pub memory_messages: &'static str,
    pub memory_discoveries: &'static str,
    pub memory_tokens: &'static str,
    pub memory_window: &'static str,
    pub bye: &'static str,
}

const EN: Texts = Texts {
    commands: "Commands:",
    help: &[
        ("/help, /h, /?", "Show this help"),
        ("/roles", "List roles and their backends"),
        ("/<role> [-y]", "Talk to a role directly (-y: auto-approve its tools)"),
        ("/complex [-y]", "Auto-pilot: roles collaborate until done"),
        ("/yes", "Toggle auto-approve for all roles"),
        ("/status", "Show active role, frames and approvals"),
        ("/context", "Show recent history and discoveries"),
        ("/memory", "History and discovery counts with token estimates"),
        ("/stats", "Backend calls and token estimates per role"),
        ("/config", "Show current configuration"),
        ("/lang [en|zh]", "Switch the session language"),
        ("/clear", "Clear conversation history"),
        ("/quit, /exit, /q", "Exit"),
    ],
    markers: "Markers roles use:",
    cancel_hint: "Press Ctrl-C while a request runs to cancel it.",
    welcome_hint: "Type a request, /<role> to switch roles, /complex for auto-pilot, /help for help.",
    history_cleared: "Conversation history cleared (discoveries kept).",
    auto_approve_on: "Auto-approve ON: writes and commands run without asking.",
    auto_approve_off: "Auto-approve OFF.",
    language_switched: "Language: English",
    unknown_command: "Unknown command:",
    type_help: "Type /help for available commands",
    request_cancelled: "Request cancelled.",
    no_calls: "No backend calls yet.",
    memory_title: "Conversation memory:",
    memory_messages: "Messages",
    memory_discoveries: "Discoveries",
    memory_tokens: "Estimated tokens",
    memory_window: "Sent per call",
    bye: "Bye!",
};

const ZH: Texts = Texts {
    commands: "可用命令:",
    help: &[
        ("/help, /h, /?", "显示帮助信息"),
        ("/roles", "显示角色及其后端"),
        ("/<role> [-y]", "直接与角色对话 (-y: 自动批准其工具调用)"),
        ("/complex [-y]", "自动协作: 角色协作直至完成"),
        ("/yes", "切换所有角色的自动批准"),
        ("/status", "显示当前角色、委派栈和批准状态"),
        ("/context", "显示最近历史和共享发现"),
        ("/memory", "记忆统计: 消息数、发现数和 token 估算"),
        ("/stats", "各角色的 API 调用和 token 估算"),
        ("/config", "显示当前配置"),
        ("/lang [en|zh]", "切换会话语言"),
        ("/clear", "清空对话历史"),
        ("/quit, /exit, /q", "退出"),
    ],
    markers: "角色使用的协作标记:",
    cancel_hint: "请求运行时按 Ctrl-C 可取消。",
    welcome_hint: "输入请求, /<role> 切换角色, /complex 启用自动协作, /help 查看帮助。",
    history_cleared: "对话历史已清空 (保留共享发现)。",
    auto_approve_on: "自动批准已开启: 写入和命令将直接执行。",
    auto_approve_off: "自动批准已关闭。",
    language_switched: "语言: 中文",
    unknown_command: "未知命令:",
    type_help: "输入 /help 查看可用命令",
    request_cancelled: "请求已取消。",
    no_calls: "尚无 API 调用。",
    memory_title: "对话记忆:",
    memory_messages: "消息",
    memory_discoveries: "共享发现",
    memory_tokens: "估算 tokens",
    memory_window: "每次调用发送",
    bye: "再见!",
};

pub fn texts(language: Language) -> &'static Texts {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_cover_the_same_commands() {
        let en: Vec<&str> = texts(Language::En).help.iter().map(|(c, _)| *c).collect();
        let zh: Vec<&str> = texts(Language::Zh).help.iter().map(|(c, _)| *c).collect();
        assert_eq!(en, zh);
        assert!(en.contains(&"/memory"));
        assert!(en.contains(&"/lang [en|zh]"));
    }

    #[test]
    fn test_switch_message_names_the_new_language() {
        assert_eq!(texts(Language::Zh).language_switched, "语言: 中文");
        assert_eq!(texts(Language::En).language_switched, "Language: English");
    }
}
