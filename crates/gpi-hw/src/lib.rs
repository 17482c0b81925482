//! gpi-hw: collaborator ports for the GPI control core.
//!
//! The core never talks to hardware or an operator directly; it depends on
//! the capability traits defined here. Which implementation is bound is a
//! startup decision made by the surrounding shell:
//! - [`Transport`] — valve trigger lines and gauge ADC reads. Real
//!   implementations live with the shell; [`ZeroTransport`] stands in when
//!   the device is unreachable, [`BenchTransport`] drives tests.
//! - [`ConfirmationGate`] — interactive confirm/cancel before manual valve
//!   commands.
//! - [`StatusSink`] — presentation-side notifications (indicators, readouts).

pub mod bench;
pub mod gate;
pub mod sink;
pub mod transport;
pub mod zero;

pub use bench::BenchTransport;
pub use gate::{AutoConfirm, ConfirmationGate};
pub use sink::{NullSink, StatusSink};
pub use transport::Transport;
pub use zero::ZeroTransport;
