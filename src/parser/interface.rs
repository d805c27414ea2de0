/// Behaviour to emit handler output to the user.
///
/// Production code uses the console; tests substitute an in-memory
/// implementation to capture and inspect the output.
pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, error: String);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: String) {
        eprintln!("{error}");
    }
}

#[cfg(test)]
pub(crate) mod util {
    use super::UserInterface;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct InMemoryInterface {
        message: RefCell<Option<Vec<String>>>,
        error: RefCell<Option<String>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            // Allows for print() to be called many times, concatenating the messages.
            let mut output = self.message.borrow_mut();

            if let Some(messages) = output.as_mut() {
                messages.push(message);
            } else {
                output.replace(vec![message]);
            }
        }

        fn print_error(&self, error: String) {
            // Assumes print_error() is only ever called once.
            self.error.borrow_mut().replace(error);
        }
    }

    impl InMemoryInterface {
        pub(crate) fn consume(self) -> (Option<String>, Option<String>) {
            let InMemoryInterface { message, error } = self;

            (
                message.take().map(|messages| messages.join("\n")),
                error.take(),
            )
        }

        pub(crate) fn consume_message(self) -> String {
            let (message, error) = self.consume();
            assert_eq!(error, None);
            message.unwrap()
        }
    }
}
