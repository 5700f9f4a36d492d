use chrono::{NaiveDateTime, Utc};

/// Counters for a single crawl run.
#[derive(Clone, Debug)]
pub struct RunStats {
    pages_visited: u64,
    cards_extracted: u64,
    records_collected: u64,
    scroll_steps: u64,
    start_time: NaiveDateTime,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            pages_visited: 0,
            cards_extracted: 0,
            records_collected: 0,
            scroll_steps: 0,
            start_time: Utc::now().naive_utc(),
        }
    }

    pub fn incr_pages_visited(&mut self) {
        self.pages_visited += 1;
    }

    pub fn add_card(&mut self, num_records: usize) {
        self.cards_extracted += 1;
        self.records_collected += num_records as u64;
    }

    pub fn add_scroll_steps(&mut self, steps: usize) {
        self.scroll_steps += steps as u64;
    }

    pub fn pages_visited(&self) -> u64 {
        self.pages_visited
    }

    pub fn cards_extracted(&self) -> u64 {
        self.cards_extracted
    }

    pub fn records_collected(&self) -> u64 {
        self.records_collected
    }

    pub fn scroll_steps(&self) -> u64 {
        self.scroll_steps
    }

    /// Elapsed time since the run started in seconds
    pub fn elapsed_time(&self) -> i64 {
        let elapsed = Utc::now().naive_utc() - self.start_time;
        elapsed.num_seconds()
    }

    pub fn records_per_minute(&self) -> u64 {
        let elapsed = (self.elapsed_time() / 60) as u64;
        if elapsed > 0 {
            self.records_collected / elapsed
        } else {
            self.records_collected
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
