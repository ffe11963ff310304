use std::{
    fmt::Display,
    hash::{BuildHasher, Hash},
};

use alloy::primitives::U256;
use eyre::{OptionExt, Result};
use hashbrown::hash_map::DefaultHashBuilder;

use super::constants::STACK_LIMIT;

/// The [`Stack`] struct represents the EVM operand stack.
/// It is a LIFO data structure of 256-bit words.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Stack {
    /// The stack contents in push order.
    ///
    /// The last element of the vector is the top of the stack.
    pub stack: Vec<U256>,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    /// Creates a new [`Stack`].
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    ///
    /// let stack = Stack::new();
    /// assert_eq!(stack.size(), 0);
    /// ```
    pub fn new() -> Stack {
        Stack { stack: Vec::with_capacity(STACK_LIMIT) }
    }

    /// Push a value onto the stack.
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00));
    /// assert_eq!(stack.size(), 1);
    /// ```
    pub fn push(&mut self, value: U256) {
        self.stack.push(value);
    }

    /// Pop a value off the stack.
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x05));
    ///
    /// assert_eq!(stack.pop().expect("stack underflow"), U256::from(0x05));
    /// assert!(stack.pop().is_err());
    /// ```
    pub fn pop(&mut self) -> Result<U256> {
        self.stack.pop().ok_or_eyre("stack underflow")
    }

    /// Pop n values off the stack, top first.
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00));
    /// stack.push(U256::from(0x01));
    /// stack.push(U256::from(0x02));
    ///
    /// let values = stack.pop_n(2).expect("stack underflow");
    /// assert_eq!(values, vec![U256::from(0x02), U256::from(0x01)]);
    /// assert_eq!(stack.size(), 1);
    /// ```
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<U256>> {
        if n > self.stack.len() {
            eyre::bail!("stack underflow");
        }
        Ok(self.stack.drain(self.stack.len() - n..).rev().collect())
    }

    /// Swap the top value and the nth value below it.
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00));
    /// stack.push(U256::from(0x01));
    ///
    /// // stack is now [0x01, 0x00]
    /// assert!(stack.swap(1));
    ///
    /// // stack is now [0x00, 0x01]
    /// assert_eq!(stack.peek(0), U256::from(0x00));
    /// assert_eq!(stack.peek(1), U256::from(0x01));
    /// ```
    pub fn swap(&mut self, n: usize) -> bool {
        let len = self.stack.len();
        if n == 0 || n >= len {
            return false;
        }
        self.stack.swap(len - 1, len - 1 - n);
        true
    }

    /// Duplicate the nth value on the stack (1 is the top) onto the top.
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x07));
    /// assert!(stack.dup(1));
    /// assert_eq!(stack.size(), 2);
    /// assert!(!stack.dup(3));
    /// ```
    pub fn dup(&mut self, n: usize) -> bool {
        let len = self.stack.len();
        if n == 0 || n > len {
            return false;
        }
        let value = self.stack[len - n];
        self.stack.push(value);
        true
    }

    /// Peek at the value `index` slots below the top of the stack. Missing values read as zero.
    ///
    /// ```
    /// use tandem_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x01));
    /// stack.push(U256::from(0x02));
    /// assert_eq!(stack.peek(0), U256::from(0x02));
    /// assert_eq!(stack.peek(1), U256::from(0x01));
    /// assert_eq!(stack.peek(2), U256::ZERO);
    /// ```
    pub fn peek(&self, index: usize) -> U256 {
        self.stack
            .len()
            .checked_sub(index + 1)
            .and_then(|position| self.stack.get(position))
            .copied()
            .unwrap_or_default()
    }

    /// Get the size of the stack.
    pub fn size(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// A simple hash of the stack, used to compare contexts cheaply in traces.
    pub fn hash(&self) -> u64 {
        let mut state = DefaultHashBuilder::default().build_hasher();
        self.stack.hash(&mut state);
        std::hash::Hasher::finish(&state)
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values = self.stack.iter().rev().map(|value| format!("0x{value:x}")).collect::<Vec<_>>();
        write!(f, "[{}]", values.join(", "))
    }
}
