//! Identifiers a reply reference needs to be displayed

use super::ReplyReference;
use crate::models::{ChatId, FormattedText, MessageContent, MessageOrigin, UserId};
use std::collections::BTreeSet;

/// Something that must be known locally before a reply can be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dependency {
    Chat(ChatId),
    User(UserId),
    CustomEmoji(i64),
    Story { sender_chat_id: ChatId, story_id: i32 },
}

/// Dependencies split by how hard the caller should try to load them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    mandatory: BTreeSet<Dependency>,
    best_effort: BTreeSet<Dependency>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, dependency: Dependency) {
        self.best_effort.remove(&dependency);
        self.mandatory.insert(dependency);
    }

    /// Adds a dependency that may be skipped if it can't be loaded
    pub fn add_best_effort(&mut self, dependency: Dependency) {
        if !self.mandatory.contains(&dependency) {
            self.best_effort.insert(dependency);
        }
    }

    pub fn add_user(&mut self, user_id: UserId) {
        if user_id.is_valid() {
            self.add(Dependency::User(user_id));
        }
    }

    /// Adds the chat and whatever is needed to show it
    pub fn add_chat_and_dependencies(&mut self, chat_id: ChatId) {
        if !chat_id.is_valid() {
            return;
        }
        self.add(Dependency::Chat(chat_id));
        if let ChatId::User(user_id) = chat_id {
            self.add_user(user_id);
        }
    }

    pub fn add_formatted_text(&mut self, text: &FormattedText) {
        for user_id in text.mentioned_users() {
            self.add_user(user_id);
        }
        for custom_emoji_id in text.custom_emoji_ids() {
            self.add(Dependency::CustomEmoji(custom_emoji_id));
        }
    }

    pub fn add_origin(&mut self, origin: &MessageOrigin) {
        if let Some(user_id) = origin.sender_user_id() {
            self.add_user(user_id);
        }
        if let Some(chat_id) = origin.sender_chat_id() {
            self.add_chat_and_dependencies(chat_id);
        }
    }

    /// Adds what a content refers to. Contacts shared by automated accounts
    /// often point at users the account has never seen, so they are only
    /// loaded on a best-effort basis.
    pub fn add_content(&mut self, content: &MessageContent, is_bot: bool) {
        match content {
            MessageContent::Contact {
                user_id: Some(user_id),
                ..
            } => {
                if is_bot {
                    if user_id.is_valid() {
                        self.add_best_effort(Dependency::User(*user_id));
                    }
                } else {
                    self.add_user(*user_id);
                }
            }
            MessageContent::Game { bot_user_id, .. } => self.add_user(*bot_user_id),
            MessageContent::Giveaway { channel_ids, .. } => {
                for chat_id in channel_ids {
                    self.add_chat_and_dependencies(*chat_id);
                }
            }
            MessageContent::Story {
                sender_chat_id,
                story_id,
            } => {
                self.add_chat_and_dependencies(*sender_chat_id);
                self.add(Dependency::Story {
                    sender_chat_id: *sender_chat_id,
                    story_id: *story_id,
                });
            }
            MessageContent::Text { text } => self.add_formatted_text(text),
            _ => {}
        }
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &Dependency> {
        self.mandatory.iter()
    }

    pub fn best_effort(&self) -> impl Iterator<Item = &Dependency> {
        self.best_effort.iter()
    }

    pub fn contains(&self, dependency: &Dependency) -> bool {
        self.mandatory.contains(dependency) || self.best_effort.contains(dependency)
    }

    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.best_effort.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mandatory.len() + self.best_effort.len()
    }
}

impl ReplyReference {
    /// Reports every identifier the reference touches. `is_bot` tells whether
    /// the owning message was sent by an automated account.
    pub fn add_dependencies(&self, dependencies: &mut Dependencies, is_bot: bool) {
        if let Some(chat_id) = self.target_chat_id {
            dependencies.add_chat_and_dependencies(chat_id);
        }
        if let Some(origin) = &self.origin {
            dependencies.add_origin(origin);
        }
        dependencies.add_formatted_text(&self.quote);
        if let Some(content) = &self.content {
            dependencies.add_content(content, is_bot);
        }
    }
}

/// Collects the dependencies of a single reply reference
pub fn dependencies_of(reply: &ReplyReference, is_bot: bool) -> Dependencies {
    let mut dependencies = Dependencies::new();
    reply.add_dependencies(&mut dependencies, is_bot);
    dependencies
}
