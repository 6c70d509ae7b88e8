// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Message, Role, Sequence};

/// Append-only transcript of user queries and service answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
    last_sequence: Sequence,
}

impl MessageLog {
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Sequence {
        let sequence = self.last_sequence.next();
        self.last_sequence = sequence;
        self.entries.push(Message {
            role,
            content: content.into(),
            sequence,
        });
        sequence
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageLog;
    use crate::{Role, Sequence};

    #[test]
    fn sequences_increase_in_append_order() {
        let mut log = MessageLog::default();
        let first = log.append(Role::User, "one");
        let second = log.append(Role::System, "two");
        let third = log.append(Role::User, "three");

        assert_eq!(first, Sequence::new(1));
        assert!(first < second && second < third);

        let contents = log
            .entries()
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(log.last().map(|message| message.role), Some(Role::User));
    }
}
