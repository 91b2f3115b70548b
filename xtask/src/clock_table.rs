use anyhow::Result;
use clocking::mocks::{MockClock, MockDai};
use clocking::{resolve, supported_formats, CodecLink, PllReport};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

pub fn run(verbose: bool) -> Result<()> {
    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("clocking=trace"))
            .init();
    }

    println!();
    println!("{}", "🕒 Supported stream formats".cyan().bold());
    println!();
    println!(
        "{}",
        format!(
            "  {:>5}  {:>8}  {:>4}  {:>4}  {:>11}  {:>3}  {:>11}  {}",
            "width",
            "fs (Hz)",
            "bfs",
            "rfs",
            "rclk (Hz)",
            "psr",
            "pll (Hz)",
            "pll step"
        )
        .bold()
    );

    // One PLL shared across every negotiation, as on the board: consecutive
    // formats from the same family leave it untouched.
    let mut clock = MockClock::new(0);
    let mut count = 0usize;
    let mut reprograms = 0usize;

    for format in supported_formats() {
        let label = format!("{} bit @ {} Hz", format.width, format.frame_rate);
        let plan = resolve(format)
            .map_err(|e| anyhow::anyhow!("{label} listed but not resolvable: {e}"))?;

        let mut link = CodecLink::new(&mut clock, MockDai::new());
        let negotiated = link
            .negotiate(format)
            .map_err(|e| anyhow::anyhow!("mock negotiation failed for {label}: {e}"))?;

        let step = match negotiated.pll {
            PllReport::Unchanged { .. } => "kept".dimmed(),
            PllReport::Reprogrammed { previous, .. } => {
                reprograms = reprograms.saturating_add(1);
                format!("retuned from {previous}").yellow()
            }
        };

        println!(
            "  {:>5}  {:>8}  {:>4}  {:>4}  {:>11}  {:>3}  {:>11}  {}",
            format.width,
            format.frame_rate,
            plan.bit_clock_scale(),
            plan.frame_clock_scale(),
            plan.bit_clock_rate(),
            plan.prescale_ratio(),
            plan.pll_target_rate(),
            step
        );
        count = count.saturating_add(1);
    }

    println!();
    println!(
        "{}",
        format!("✓ {count} formats, {reprograms} PLL reprogram(s)")
            .green()
            .bold()
    );
    println!();

    Ok(())
}
