/*!
 * Context Module
 * Read-only views of the intercepted operation handed to each evaluator
 */

mod file;
mod packet;

pub use file::{AccessMask, FileName, FileOperationContext};
pub use packet::{EthernetHeader, Ipv4Header, Layer, Malformed, PacketContext, TcpHeader};
