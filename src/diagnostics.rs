use crate::error::Chip8Error;
use crate::instruction::Instruction;
use std::fmt;

/// what the interpreter is ready to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// the next `step()` fetches and executes
    Running,
    /// an Fx0A is pending; `step()` does nothing until `resume(key)` is called
    AwaitingKey { register: usize },
}

/// What happened during one `step()`. The interpreter hands these back
/// rather than logging or displaying anything itself; what to do with them
/// is up to the host.
#[derive(Debug)]
pub struct StepEvent {
    /// where the opcode was fetched from
    pub address: u16,
    pub opcode: u16,
    /// `None` if the opcode didn't decode
    pub instruction: Option<Instruction>,
    /// non-fatal problems, i.e. `UnknownOpcode`
    pub fault: Option<Chip8Error>,
    /// state after the step
    pub status: Status,
}

impl StepEvent {
    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.status, Status::AwaitingKey { .. })
    }
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}: {:04X}", self.address, self.opcode)?;
        match &self.instruction {
            Some(i) => write!(f, "  {}", i)?,
            None => write!(f, "  ???")?,
        }
        if let Some(fault) = &self.fault {
            write!(f, "  ({})", fault)?;
        }
        if self.is_awaiting_key() {
            write!(f, "  [waiting for key]")?;
        }
        Ok(())
    }
}
