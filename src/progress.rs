//! Progress reporting for long-running pipelines.
//!
//! [`Progress`] is a pass-through stage that counts what flows through it and hands the count to a
//! [`ProgressCallback`] every now and then. [`Bar`] is a callback that draws a terminal progress bar.

use std::io::Write;
use std::time::{Duration, Instant};
use fehler::{throw, throws};

use crate::pipeline::Stage;
use crate::Error;

/// Receives `(current, total, elapsed)` updates.
pub trait ProgressCallback {
    fn report(&mut self, current: u64, total: u64, elapsed: Duration);
}

impl<F: FnMut(u64, u64, Duration)> ProgressCallback for F {
    fn report(&mut self, current: u64, total: u64, elapsed: Duration) {
        self(current, total, elapsed)
    }
}

/// How much progress a single item represents.
pub trait Measure {
    fn amount(&self) -> u64;
}

impl Measure for u8 {
    fn amount(&self) -> u64 {
        1
    }
}

impl Measure for Vec<u8> {
    fn amount(&self) -> u64 {
        self.len() as u64
    }
}

impl Measure for &[u8] {
    fn amount(&self) -> u64 {
        self.len() as u64
    }
}

/// Forwards everything it receives and reports how much went through.
///
/// Reports are made once on creation, then whenever `interval` has passed since the last one or
/// the total has been reached, and once more on close unless the previous report already showed
/// the final count.
pub struct Progress<S, C> {
    next: S,
    callback: C,
    current: u64,
    total: u64,
    interval: Duration,
    begun: Instant,
    prev: Instant,
    reported: Option<u64>,
    closed: bool,
}

impl<S, C: ProgressCallback> Progress<S, C> {
    pub fn new(next: S, total: u64, mut callback: C) -> Self {
        let now = Instant::now();
        callback.report(0, total, Duration::from_secs(0));
        Progress {
            next,
            callback,
            current: 0,
            total,
            interval: Duration::from_secs(1),
            begun: now,
            prev: now,
            reported: Some(0),
            closed: false,
        }
    }

    /// Minimum time between two reports. One second by default.
    pub fn interval(mut self, v: Duration) -> Self {
        self.interval = v;
        self
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn into_inner(self) -> S {
        self.next
    }

    fn report(&mut self, now: Instant) {
        self.prev = now;
        self.reported = Some(self.current);
        self.callback.report(self.current, self.total, now - self.begun);
    }

    fn advance(&mut self, amount: u64) {
        self.current += amount;
        let now = Instant::now();
        if now - self.prev >= self.interval || self.current >= self.total {
            self.report(now);
        }
    }

    /// Makes a final report, then closes downstream.
    #[throws]
    pub fn close<T>(&mut self)
    where
        S: Stage<T>,
    {
        if self.closed {
            return;
        }
        self.closed = true;

        if self.reported != Some(self.current) {
            self.report(Instant::now());
        }
        self.next.close()?;
    }
}

impl<T: Measure, S: Stage<T>, C: ProgressCallback> Stage<T> for Progress<S, C> {
    #[throws]
    fn receive(&mut self, item: T) {
        if self.closed {
            throw!(Error::Closed);
        }
        self.advance(item.amount());
        self.next.receive(item)?;
    }

    fn close(&mut self) -> Result<(), Error> {
        Progress::close::<T>(self)
    }
}

/// Draws a bar like `message [####------] 400/1000 01.250` on every report.
pub struct Bar<W> {
    out: W,
    message: String,
    width: usize,
}

impl<W: Write> Bar<W> {
    pub fn new(out: W) -> Self {
        Bar { out, message: String::new(), width: 10 }
    }

    /// Text printed in front of the bar.
    pub fn message(mut self, v: &str) -> Self {
        self.message = if v.is_empty() { String::new() } else { format!("{} ", v) };
        self
    }

    /// Number of cells in the bar. Ten by default.
    pub fn width(mut self, v: usize) -> Self {
        self.width = v;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, current: u64, total: u64, elapsed: Duration) -> String {
        let filled = if total == 0 {
            self.width
        } else {
            ((current.min(total) as f64 / total as f64) * self.width as f64) as usize
        };
        format!(
            "\r{}[{}{}] {:>w$}/{} {}{}",
            self.message,
            "#".repeat(filled),
            "-".repeat(self.width - filled),
            current,
            total,
            format_time(elapsed),
            if current >= total { "\n" } else { "" },
            w = total.to_string().len(),
        )
    }
}

impl<W: Write> ProgressCallback for Bar<W> {
    fn report(&mut self, current: u64, total: u64, elapsed: Duration) {
        let line = self.render(current, total, elapsed);
        // a broken terminal is no reason to fail the pipeline
        if let Err(e) = self.out.write_all(line.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::debug!(error = %e, "could not draw progress bar");
        }
    }
}

/// Human-readable duration, leaving out leading units that are zero.
///
/// ```
/// # use std::time::Duration;
/// # use plz::progress::format_time;
/// assert_eq!(format_time(Duration::from_millis(3_723_004)), "01:02:03.004");
/// assert_eq!(format_time(Duration::from_millis(123_004)), "02:03.004");
/// assert_eq!(format_time(Duration::from_millis(3_004)), "03.004");
/// assert_eq!(format_time(Duration::from_millis(4)), "004");
/// ```
pub fn format_time(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    let (h, m, s, ms) = (ms / 3_600_000, ms / 60_000 % 60, ms / 1000 % 60, ms % 1000);

    let mut out = String::new();
    if h > 0 {
        out += &format!("{:02}:", h);
    }
    if h > 0 || m > 0 {
        out += &format!("{:02}:", m);
    }
    if h > 0 || m > 0 || s > 0 {
        out += &format!("{:02}.", s);
    }
    out += &format!("{:03}", ms);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Count {
        items: usize,
        closed: bool,
    }

    impl Stage<u8> for Count {
        fn receive(&mut self, _: u8) -> Result<(), Error> {
            self.items += 1;
            Ok(())
        }

        fn close(&mut self) -> Result<(), Error> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn reports_every_item_without_interval() {
        let mut seen = Vec::new();
        let mut progress = Progress::new(Count::default(), 3, |c: u64, t: u64, _: Duration| seen.push((c, t)))
            .interval(Duration::from_secs(0));
        for &b in b"abc" {
            progress.receive(b).unwrap();
        }
        progress.close::<u8>().unwrap();
        let inner = progress.into_inner();
        assert_eq!(inner.items, 3);
        assert!(inner.closed);
        // the close does not repeat the final count
        assert_eq!(seen, [(0, 3), (1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn rate_limited_reports_still_show_the_end() {
        let mut seen = Vec::new();
        let mut progress = Progress::new(Count::default(), 100, |c: u64, t: u64, _: Duration| seen.push((c, t)))
            .interval(Duration::from_secs(3600));
        for _ in 0..10 {
            progress.receive(0u8).unwrap();
        }
        Stage::<u8>::close(&mut progress).unwrap();
        drop(progress);
        assert_eq!(seen, [(0, 100), (10, 100)]);
    }

    #[test]
    fn chunks_count_their_length() {
        struct Swallow;
        impl Stage<Vec<u8>> for Swallow {
            fn receive(&mut self, _: Vec<u8>) -> Result<(), Error> {
                Ok(())
            }
            fn close(&mut self) -> Result<(), Error> {
                Ok(())
            }
        }

        let mut progress = Progress::new(Swallow, 10, |_: u64, _: u64, _: Duration| {}).interval(Duration::from_secs(0));
        progress.receive(vec![0; 4]).unwrap();
        progress.receive(vec![0; 6]).unwrap();
        assert_eq!(progress.current(), 10);
    }

    #[test]
    fn bar_rendering() {
        let mut bar = Bar::new(Vec::new()).message("lz").width(4);
        bar.report(0, 100, Duration::from_millis(0));
        bar.report(50, 100, Duration::from_millis(1500));
        bar.report(100, 100, Duration::from_millis(61_000));
        let drawn = String::from_utf8(bar.into_inner()).unwrap();
        assert_eq!(
            drawn,
            "\rlz [----]   0/100 000\rlz [##--]  50/100 01.500\rlz [####] 100/100 01:01.000\n"
        );
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(Duration::from_millis(0)), "000");
        assert_eq!(format_time(Duration::from_millis(60_000)), "01:00.000");
        assert_eq!(format_time(Duration::from_millis(3_600_000)), "01:00:00.000");
    }
}
