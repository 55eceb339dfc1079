use std::fmt;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PagerStats {
    /// Faults delivered by the controller
    pub faults: u64,

    /// Faults on resident pages resolved by granting write access
    pub write_upgrades: u64,

    /// Frames cleared for a demand-zero load
    pub zero_fills: u64,

    /// Pages brought back from their backing block
    pub disk_reads: u64,

    /// Dirty frames written back on eviction
    pub disk_writes: u64,

    pub evictions: u64,

    /// Times every mapping was closed to refresh reference bits
    pub visibility_resets: u64,

    /// Frames examined by the clock hand, victims included
    pub clock_steps: u64,

    pub extends: u64,

    pub extend_failures: u64,

    pub processes_created: u64,

    pub processes_destroyed: u64,
}

impl fmt::Display for PagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "faults={} upgrades={} zero_fills={} disk_reads={} disk_writes={}",
            self.faults, self.write_upgrades, self.zero_fills, self.disk_reads, self.disk_writes
        )?;
        writeln!(
            f,
            "evictions={} resets={} clock_steps={}",
            self.evictions, self.visibility_resets, self.clock_steps
        )?;
        write!(
            f,
            "extends={} extend_failures={} created={} destroyed={}",
            self.extends,
            self.extend_failures,
            self.processes_created,
            self.processes_destroyed
        )
    }
}
