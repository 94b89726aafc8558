use colored::Colorize;
use credgate_auth::VerificationCacheStats;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_rejected(msg: &str) {
    println!("{} {}", "✗".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_cache_stats(stats: &VerificationCacheStats) {
    println!("{}", "Verification cache".cyan());
    println!("  {}: {}", "entries".cyan(), stats.size);
    println!(
        "  {}: {} ({:.1}%)",
        "hits".cyan(),
        stats.hits,
        stats.hit_rate()
    );
    println!("  {}: {}", "misses".cyan(), stats.misses);
    println!("  {}: {}", "comparisons".cyan(), stats.comparisons);
    if stats.failures > 0 {
        println!("  {}: {}", "failures".red(), stats.failures);
    }
}

pub fn print_cache_disabled() {
    println!("{}", "Verification cache disabled".cyan());
}
