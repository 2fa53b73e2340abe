//! Console output for the monitor

use std::fmt;
use std::io::{self, Write};
use tally::report::TallyReport;
use tally::BlockVersion;

/// ANSI color codes for terminal output
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_GREEN: &str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
}

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print startup banner
pub fn print_banner(version: &str, network: &str) {
    println!();
    println!("{}{}  BITSMON v{}{}  {}version bits monitor{}", colors::BRIGHT_CYAN, colors::BOLD, version, colors::RESET, colors::DIM, colors::RESET);
    println!("{}  Network: {}{}{}", colors::BRIGHT_CYAN, colors::BRIGHT_GREEN, network, colors::RESET);
    println!();
}

/// Print status line with icon and color
pub fn print_status(icon: &str, message: &str, status: StatusType) {
    let color = match status {
        StatusType::Success => colors::BRIGHT_GREEN,
        StatusType::Info => colors::BRIGHT_CYAN,
        StatusType::Warning => colors::BRIGHT_YELLOW,
        StatusType::Error => colors::BRIGHT_RED,
    };

    println!("{}[{}]{} {}{}{}", color, icon, colors::RESET, color, message, colors::RESET);
}

#[derive(Debug, Clone, Copy)]
pub enum StatusType {
    Success,
    Info,
    Warning,
    Error,
}

/// Print a section header
pub fn print_section(title: &str) {
    println!();
    println!("{}{}{}", colors::DIM, RULE, colors::RESET);
    println!("{}  {}{}{}", colors::BRIGHT_CYAN, colors::BOLD, title, colors::RESET);
    println!("{}{}{}", colors::DIM, RULE, colors::RESET);
    println!();
}

/// Print key-value pair in a formatted way
pub fn print_kv(key: &str, value: &str) {
    println!("  {}{}:{} {}{}{}", colors::BRIGHT_WHITE, key, colors::RESET, colors::BRIGHT_CYAN, value, colors::RESET);
}

/// Print configuration summary
pub fn print_config_summary(config: &crate::config::Config) {
    print_section("Configuration");

    print_kv("Network", &config.network.network_id);
    print_kv("Node RPC", &format!("{}:{}", config.rpc.host, config.rpc.port));
    print_kv("Auth", if config.credentials().is_some() { "Basic" } else { "None" });
    print_kv("Window", &format!("{} blocks", config.monitor.window_size));
    print_kv("Retarget Interval", &format!("{} blocks", config.monitor.retarget_interval));
    print_kv("Poll Interval", &format!("{} ms", config.monitor.poll_interval_ms));
    print_kv("Fetch Concurrency", &config.monitor.fetch_concurrency.to_string());
}

pub fn format_version(version: BlockVersion) -> String {
    format!("0x{:08x}", version)
}

/// Tally report rendered for the terminal.
pub struct ReportView<'a>(pub &'a TallyReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "{}{}{}", colors::DIM, RULE, colors::RESET)?;
        writeln!(f, "{}  Version Tally{}", colors::BRIGHT_CYAN, colors::RESET)?;
        writeln!(f, "{}{}{}", colors::DIM, RULE, colors::RESET)?;
        writeln!(f)?;
        writeln!(f, "  {}Current height:{}   {}", colors::BRIGHT_WHITE, colors::RESET, report.tip_height)?;
        writeln!(
            f,
            "  {}Block range:{}      {} to {} ({} blocks)",
            colors::BRIGHT_WHITE,
            colors::RESET,
            report.window_start,
            report.tip_height,
            report.window_size
        )?;
        writeln!(
            f,
            "  {}Next retarget:{}    {} (in {} blocks)",
            colors::BRIGHT_WHITE,
            colors::RESET,
            report.next_retarget,
            report.blocks_until_retarget
        )?;
        writeln!(f)?;

        for row in &report.versions {
            let marker = if row.uses_version_bits { "" } else { " legacy" };
            writeln!(
                f,
                "  {:>7} version {}{}{} blocks ({:.2}%){}{}{}",
                row.count,
                colors::BRIGHT_CYAN,
                format_version(row.version),
                colors::RESET,
                row.share,
                colors::DIM,
                marker,
                colors::RESET
            )?;
        }

        if !report.bits.is_empty() {
            writeln!(f)?;
            writeln!(f, "  {}Signaling bits:{}", colors::BRIGHT_WHITE, colors::RESET)?;
            for bit in &report.bits {
                writeln!(
                    f,
                    "    bit {:>2}: {}{:>7} blocks ({:.2}%){}",
                    bit.bit,
                    colors::BRIGHT_GREEN,
                    bit.count,
                    bit.share,
                    colors::RESET
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "  {}Total blocks:{}     {}", colors::BRIGHT_WHITE, colors::RESET, report.total_blocks)?;
        writeln!(f)
    }
}

/// Progress bar for the initial window scan
pub struct ProgressBar {
    width: usize,
    current: usize,
    total: usize,
    label: String,
    last_percentage: Option<usize>,
}

impl ProgressBar {
    pub fn new(label: String, total: usize) -> Self {
        Self {
            width: 50,
            current: 0,
            total,
            label,
            last_percentage: None,
        }
    }

    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);
        let percentage = self.percentage();
        if self.last_percentage != Some(percentage) {
            self.last_percentage = Some(percentage);
            self.render(percentage);
        }
    }

    pub fn percentage(&self) -> usize {
        if self.total > 0 {
            (self.current as f64 / self.total as f64 * 100.0) as usize
        } else {
            0
        }
    }

    fn render(&self, percentage: usize) {
        let filled = self.width * percentage / 100;
        let empty = self.width - filled;

        print!("\r{}  {}: [", colors::BRIGHT_CYAN, self.label);
        print!("{}{}", colors::BRIGHT_GREEN, "█".repeat(filled));
        print!("{}{}", colors::DIM, "░".repeat(empty));
        print!("{}] {}% ({}/{}){}", colors::RESET, percentage, self.current, self.total, colors::RESET);

        let _ = io::stdout().flush();
    }

    pub fn finish(&self) {
        println!();
    }
}
