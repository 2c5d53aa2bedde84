//! Register access used by the charger core.

use embedded_hal_async::i2c::I2c;

/// Byte-wide access to the charger's register space.
///
/// Offsets are absolute (base already applied). Implementations are expected to serialize access
/// to the underlying bus themselves if it is shared with other peripherals.
#[allow(async_fn_in_trait)]
pub trait RegisterPort {
    /// Transport error
    type Error: core::fmt::Debug;

    /// Read `buf.len()` consecutive registers starting at `offset`
    async fn read_bulk(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write one register
    async fn write(&mut self, offset: u16, value: u8) -> Result<(), Self::Error>;

    /// Read one register
    async fn read(&mut self, offset: u16) -> Result<u8, Self::Error> {
        let mut val = 0u8;
        self.read_bulk(offset, core::slice::from_mut(&mut val)).await?;
        Ok(val)
    }

    /// Update the bits selected by `mask` to the corresponding bits of `value`
    async fn write_masked(&mut self, offset: u16, mask: u8, value: u8) -> Result<(), Self::Error> {
        let val = self.read(offset).await?;
        self.write(offset, val & !mask | value & mask).await
    }
}

/// A [`RegisterPort`] for a charger reached over I2C with a 16-bit register pointer
pub struct I2cPort<D> {
    i2c_dev: D,
    addr: u8,
}

impl<D: I2c> I2cPort<D> {
    /// Create a new `I2cPort` talking to the 7-bit address `addr`
    pub fn new(i2c_dev: D, addr: u8) -> Self {
        I2cPort { i2c_dev, addr }
    }

    /// Release the underlying bus
    pub fn release(self) -> D {
        self.i2c_dev
    }
}

impl<D: I2c> RegisterPort for I2cPort<D> {
    type Error = D::Error;

    async fn read_bulk(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c_dev
            .write_read(self.addr, &offset.to_be_bytes(), buf)
            .await
    }

    async fn write(&mut self, offset: u16, value: u8) -> Result<(), Self::Error> {
        let [hi, lo] = offset.to_be_bytes();
        self.i2c_dev.write(self.addr, &[hi, lo, value]).await
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    use super::*;

    const ADDR: u8 = 0x08;

    #[tokio::test]
    async fn read_sends_big_endian_pointer() {
        let expectations = [Transaction::write_read(ADDR, vec![0x13, 0x10], vec![0x04])];
        let mut port = I2cPort::new(Mock::new(&expectations), ADDR);

        assert_eq!(port.read(0x1310).await.unwrap(), 0x04);

        port.release().done();
    }

    #[tokio::test]
    async fn bulk_read_fills_buffer() {
        let expectations = [Transaction::write_read(
            ADDR,
            vec![0x13, 0x0e],
            vec![0x95, 0x04],
        )];
        let mut port = I2cPort::new(Mock::new(&expectations), ADDR);

        let mut buf = [0u8; 2];
        port.read_bulk(0x130e, &mut buf).await.unwrap();
        assert_eq!(u16::from_le_bytes(buf), 0x0495);

        port.release().done();
    }

    #[tokio::test]
    async fn write_masked_preserves_other_bits() {
        let expectations = [
            Transaction::write_read(ADDR, vec![0x12, 0x42], vec![0b1010_0000]),
            Transaction::write(ADDR, vec![0x12, 0x42, 0b1010_0001]),
            Transaction::write_read(ADDR, vec![0x12, 0x42], vec![0b1010_0001]),
            Transaction::write(ADDR, vec![0x12, 0x42, 0b1010_0000]),
        ];
        let mut port = I2cPort::new(Mock::new(&expectations), ADDR);

        port.write_masked(0x1242, 0x01, 0x01).await.unwrap();
        port.write_masked(0x1242, 0x01, 0x00).await.unwrap();

        port.release().done();
    }
}
