//! Reversible transform for task text fields at the persistence boundary.
//!
//! The store applies `encode` on write and `decode` on read, so a cipher can
//! sit at the adapter boundary without the data model knowing. The default
//! codec is a passthrough.

use crate::models::TaskRecord;

pub trait TextCodec: Send + Sync {
    fn encode(&self, text: &str) -> String;
    fn decode(&self, text: &str) -> String;
}

/// Stores text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl TextCodec for Passthrough {
    fn encode(&self, text: &str) -> String {
        text.to_string()
    }

    fn decode(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Transform the text fields of a record on its way to disk.
pub fn encode_record(codec: &dyn TextCodec, mut record: TaskRecord) -> TaskRecord {
    record.title = codec.encode(&record.title);
    record.description = codec.encode(&record.description);
    record.subject = codec.encode(&record.subject);
    record
}

/// Undo `encode_record` on a record read back from disk.
pub fn decode_record(codec: &dyn TextCodec, mut record: TaskRecord) -> TaskRecord {
    record.title = codec.decode(&record.title);
    record.description = codec.decode(&record.description);
    record.subject = codec.decode(&record.subject);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::Utc;

    /// Toy reversible codec for exercising the seam.
    struct Rot13;

    impl TextCodec for Rot13 {
        fn encode(&self, text: &str) -> String {
            text.chars()
                .map(|c| match c {
                    'a'..='z' => (((c as u8 - b'a' + 13) % 26) + b'a') as char,
                    'A'..='Z' => (((c as u8 - b'A' + 13) % 26) + b'A') as char,
                    other => other,
                })
                .collect()
        }

        fn decode(&self, text: &str) -> String {
            self.encode(text)
        }
    }

    fn sample() -> TaskRecord {
        let now = Utc::now();
        TaskRecord {
            user_id: "u1".into(),
            title: "Essay".into(),
            description: "Draft the intro".into(),
            priority: Priority::High,
            deadline: now,
            subject: "cat1".into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn passthrough_leaves_fields_alone() {
        let encoded = encode_record(&Passthrough, sample());
        assert_eq!(encoded.title, "Essay");
        assert_eq!(encoded.description, "Draft the intro");
        assert_eq!(encoded.subject, "cat1");
    }

    #[test]
    fn codec_round_trips_text_fields() {
        let encoded = encode_record(&Rot13, sample());
        assert_eq!(encoded.title, "Rffnl");
        assert_ne!(encoded.description, "Draft the intro");

        let decoded = decode_record(&Rot13, encoded);
        assert_eq!(decoded.title, "Essay");
        assert_eq!(decoded.description, "Draft the intro");
        assert_eq!(decoded.subject, "cat1");
    }

    #[test]
    fn non_text_fields_untouched() {
        let encoded = encode_record(&Rot13, sample());
        assert_eq!(encoded.user_id, "u1");
        assert_eq!(encoded.priority, Priority::High);
        assert!(!encoded.completed);
    }
}
