//! Banked DRAM timing model with open-page and close-page row buffer
//! policies.

use super::cache::{get_log_2, is_pow_2};

pub const NUM_BANKS: usize = 16;

const DELAY_BUS: u32 = 10;
const DELAY_CAS: u32 = 45;
const DELAY_ACT: u32 = 45;
const DELAY_PRE: u32 = 45;

/// Flat delay used by mode B, which never consults a row buffer at all.
pub const MODE_B_FIXED_DELAY: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DramPolicy {
    #[default]
    Open,
    Close,
}

/// Per-bank record of the most recently activated row.
#[derive(Clone, Copy, Default)]
struct RowBuffer {
    valid: bool,
    row_id: u32,
}

/// Banked DRAM model: one row buffer per bank, independent banks.
pub struct Dram {
    policy: DramPolicy,
    banks: Vec<RowBuffer>,
    bank_bits: usize,

    pub stat_read_access: u64,
    pub stat_write_access: u64,
    pub stat_read_delay: u64,
    pub stat_write_delay: u64,
}

impl Dram {
    pub fn make(policy: DramPolicy) -> Self {
        assert!(is_pow_2(NUM_BANKS));
        Self {
            policy,
            banks: vec![RowBuffer::default(); NUM_BANKS],
            bank_bits: get_log_2(NUM_BANKS),
            stat_read_access: 0,
            stat_write_access: 0,
            stat_read_delay: 0,
            stat_write_delay: 0,
        }
    }

    fn bank_of(&self, line_addr: u32) -> (usize, u32) {
        let row = line_addr >> self.bank_bits;
        (row as usize % NUM_BANKS, row)
    }

    /// Computes and records the delay of one DRAM access. Always succeeds.
    pub fn access(&mut self, line_addr: u32, is_write: bool) -> u32 {
        let (bank, row) = self.bank_of(line_addr);
        let delay = DELAY_BUS + self.activation_delay(bank, row);

        if is_write {
            self.stat_write_access += 1;
            self.stat_write_delay += delay as u64;
        } else {
            self.stat_read_access += 1;
            self.stat_read_delay += delay as u64;
        }
        delay
    }

    fn activation_delay(&mut self, bank: usize, row: u32) -> u32 {
        let buf = &mut self.banks[bank];
        match self.policy {
            DramPolicy::Open => {
                if buf.valid {
                    if buf.row_id == row {
                        DELAY_CAS
                    } else {
                        buf.row_id = row;
                        DELAY_PRE + DELAY_ACT + DELAY_CAS
                    }
                } else {
                    buf.valid = true;
                    buf.row_id = row;
                    DELAY_ACT + DELAY_CAS
                }
            }
            DramPolicy::Close => {
                buf.row_id = row;
                buf.valid = false;
                DELAY_ACT + DELAY_CAS
            }
        }
    }

    /// Records a fixed-delay access without consulting any row buffer, used
    /// by mode B which bypasses the row-buffer model entirely.
    pub fn access_flat(&mut self, is_write: bool, delay: u32) -> u32 {
        if is_write {
            self.stat_write_access += 1;
            self.stat_write_delay += delay as u64;
        } else {
            self.stat_read_access += 1;
            self.stat_read_delay += delay as u64;
        }
        delay
    }

    pub fn read_delay_avg(&self) -> f64 {
        if self.stat_read_access == 0 {
            0.0
        } else {
            self.stat_read_delay as f64 / self.stat_read_access as f64
        }
    }

    pub fn write_delay_avg(&self) -> f64 {
        if self.stat_write_access == 0 {
            0.0
        } else {
            self.stat_write_delay as f64 / self.stat_write_access as f64
        }
    }
}
