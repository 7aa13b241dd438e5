use super::record::ResultRecord;
use std::collections::HashSet;

/// Outcome of offering a record to a [`Limiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// Same URL already accepted; the earlier record stays.
    Duplicate,
    /// Limit reached; nothing more is accepted.
    Full,
}

/// URL-unique, size-capped accumulator. First seen wins.
#[derive(Debug)]
pub struct Limiter {
    limit: usize,
    seen: HashSet<String>,
    accepted: Vec<ResultRecord>,
}

impl Limiter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            accepted: Vec::with_capacity(limit.min(64)),
        }
    }

    pub fn offer(&mut self, record: ResultRecord) -> Offer {
        if self.is_full() {
            return Offer::Full;
        }
        if !self.seen.insert(record.url.clone()) {
            return Offer::Duplicate;
        }
        self.accepted.push(record);
        Offer::Accepted
    }

    pub fn is_full(&self) -> bool {
        self.accepted.len() >= self.limit
    }

    pub(crate) fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.accepted
    }
}

/// Keep the first `limit` records with distinct URLs, in input order.
pub fn fold<I>(records: I, limit: usize) -> Vec<ResultRecord>
where
    I: IntoIterator<Item = ResultRecord>,
{
    let mut limiter = Limiter::new(limit);
    for record in records {
        if limiter.offer(record) == Offer::Full {
            break;
        }
    }
    limiter.into_records()
}
