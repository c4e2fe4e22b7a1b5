//! Sanitization of quoted excerpts

use super::Sanitized;
use crate::environment::{FixOptions, IdentityResolver, TextFormatter};
use crate::error::{FormatError, ReplyAnomaly};
use crate::models::{EntityKind, FormattedText, MessageEntity};
use crate::wire::{WireEntity, WireEntityKind, WireText};

/// Turns a raw quote into formatted text that passed the shared fix-up rules.
///
/// If fixing fails, the text is kept only when it can be coerced into a clean
/// string, and all spans are dropped.
pub fn sanitize_quote<E>(env: &E, text: WireText, entities: Vec<WireEntity>) -> Sanitized<FormattedText>
where
    E: IdentityResolver + TextFormatter + ?Sized,
{
    let mut anomalies = Vec::new();
    let entities = resolve_entities(env, entities, &mut anomalies);

    let raw = text.into_bytes();
    let fixed = match std::str::from_utf8(&raw) {
        Ok(text) => env.fix_formatted_text(text, entities, FixOptions::QUOTE),
        Err(_) => Err(FormatError::InvalidEncoding),
    };

    let quote = match fixed {
        Ok(quote) => quote,
        Err(err) => {
            anomalies.push(ReplyAnomaly::MalformedQuote(err));
            let text = clean_input_string(raw).unwrap_or_default();
            // the coerced text must already be in the form fix-up would give it
            match env.fix_formatted_text(&text, Vec::new(), FixOptions::QUOTE) {
                Ok(fixed) => FormattedText::plain(fixed.text),
                Err(_) => FormattedText::plain(text.trim_end()),
            }
        }
    };

    Sanitized {
        value: quote,
        anomalies,
    }
}

fn resolve_entities<E>(env: &E, entities: Vec<WireEntity>, anomalies: &mut Vec<ReplyAnomaly>) -> Vec<MessageEntity>
where
    E: IdentityResolver + ?Sized,
{
    let mut resolved = Vec::with_capacity(entities.len());
    for WireEntity { kind, offset, length } in entities {
        let kind = match kind {
            WireEntityKind::Mention => EntityKind::Mention,
            WireEntityKind::Hashtag => EntityKind::Hashtag,
            WireEntityKind::Cashtag => EntityKind::Cashtag,
            WireEntityKind::BotCommand => EntityKind::BotCommand,
            WireEntityKind::Url => EntityKind::Url,
            WireEntityKind::Email => EntityKind::EmailAddress,
            WireEntityKind::Phone => EntityKind::PhoneNumber,
            WireEntityKind::BankCard => EntityKind::BankCardNumber,
            WireEntityKind::Bold => EntityKind::Bold,
            WireEntityKind::Italic => EntityKind::Italic,
            WireEntityKind::Underline => EntityKind::Underline,
            WireEntityKind::Strike => EntityKind::Strikethrough,
            WireEntityKind::Spoiler => EntityKind::Spoiler,
            WireEntityKind::Code => EntityKind::Code,
            WireEntityKind::Pre { language } if language.is_empty() => EntityKind::Pre,
            WireEntityKind::Pre { language } => EntityKind::PreCode { language },
            WireEntityKind::TextUrl { url } => EntityKind::TextUrl { url },
            WireEntityKind::MentionName { user_id } => match env.resolve_user(user_id) {
                Some(user_id) => EntityKind::MentionName { user_id },
                None => {
                    anomalies.push(ReplyAnomaly::UnknownMentionedUser { user_id });
                    continue;
                }
            },
            WireEntityKind::CustomEmoji { document_id } => EntityKind::CustomEmoji {
                custom_emoji_id: document_id,
            },
            WireEntityKind::Blockquote => EntityKind::BlockQuote,
            WireEntityKind::Unknown => {
                anomalies.push(ReplyAnomaly::UnknownQuoteEntity);
                continue;
            }
        };
        resolved.push(MessageEntity::new(kind, offset, length));
    }
    resolved
}

/// Coerces raw bytes into a string safe to show: `None` if the bytes are not
/// UTF-8, otherwise the text with carriage returns removed and other control
/// characters except tab and newline replaced by spaces.
pub fn clean_input_string(raw: Vec<u8>) -> Option<String> {
    let text = String::from_utf8(raw).ok()?;
    if !text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return Some(text);
    }
    Some(
        text.chars()
            .filter(|&c| c != '\r')
            .map(|c| {
                if c.is_control() && c != '\n' && c != '\t' {
                    ' '
                } else {
                    c
                }
            })
            .collect(),
    )
}
