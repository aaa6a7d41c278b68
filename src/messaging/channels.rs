// Communication channels lock-free

use crate::messaging::command::Command;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::{Consumer, Producer};

    #[test]
    fn test_command_channel_preserves_order() {
        let (mut tx, mut rx) = create_command_channel(4);
        assert!(tx.try_push(Command::Start).is_ok());
        assert!(tx.try_push(Command::Pause).is_ok());

        assert_eq!(rx.try_pop(), Some(Command::Start));
        assert_eq!(rx.try_pop(), Some(Command::Pause));
        assert_eq!(rx.try_pop(), None);
    }
}
