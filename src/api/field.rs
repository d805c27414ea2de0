use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::marker::PhantomData;
use std::rc::Rc;
use std::str::FromStr;

use crate::api::capture::*;
use crate::constant::PAIR_SEPARATOR;
use crate::model::Arity;
use crate::prelude::{Associative, Collectable};

/// A destination holding a single value (overwrite semantics).
pub struct Scalar<'a, T> {
    variable: Rc<RefCell<&'a mut T>>,
}

impl<'a, T> Scalar<'a, T> {
    /// Create a scalar destination.
    pub fn new(variable: &'a mut T) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
        }
    }
}

impl<'a, T> Typed<'a, T> for Scalar<'a, T>
where
    T: FromStr,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<T, AssignError> {
        T::from_str(token).map_err(|_| AssignError::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })
    }

    fn commit(&mut self, value: T) -> Result<(), AssignError> {
        **self.variable.borrow_mut() = value;
        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::One
    }
}

/// A destination that maps down to [`Option`], holding a single value.
pub struct Optional<'a, T> {
    variable: Rc<RefCell<&'a mut Option<T>>>,
}

impl<'a, T> Optional<'a, T> {
    /// Create an optional destination.
    pub fn new(variable: &'a mut Option<T>) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
        }
    }
}

impl<'a, T> Typed<'a, T> for Optional<'a, T>
where
    T: FromStr,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<T, AssignError> {
        T::from_str(token).map_err(|_| AssignError::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })
    }

    fn commit(&mut self, value: T) -> Result<(), AssignError> {
        self.variable.borrow_mut().replace(value);
        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::One
    }
}

/// A destination that takes no values; matching the key assigns the target.
pub struct Switch<'a, T> {
    variable: Rc<RefCell<&'a mut T>>,
    target: Option<T>,
}

impl<'a, T> Switch<'a, T> {
    /// Create a switch destination.
    pub fn new(variable: &'a mut T, target: T) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            target: Some(target),
        }
    }
}

impl<'a, T> Typed<'a, T> for Switch<'a, T> {
    fn matched(&mut self) {
        // Repeated matches leave the first assignment in place.
        if let Some(target) = self.target.take() {
            **self.variable.borrow_mut() = target;
        }
    }

    fn convert(&self, token: &str) -> Result<T, AssignError> {
        Err(AssignError::Rejected {
            token: token.to_string(),
            message: "a switch takes no value".to_string(),
        })
    }

    fn commit(&mut self, _value: T) -> Result<(), AssignError> {
        unreachable!("internal error - must not commit on a Switch");
    }

    fn arity(&self) -> Arity {
        Arity::None
    }
}

/// A destination that appends values to a sequence container.
///
/// Appends to any container implementing
/// [Collectable](crate::prelude::Collectable); `Vec<T>` destinations may
/// additionally opt into [`List::sorted`]/[`List::unique`] post-processing.
pub struct List<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    variable: Rc<RefCell<&'a mut C>>,
    post: Vec<Box<dyn Fn(&mut C) + 'a>>,
    _phantom: PhantomData<T>,
}

impl<'a, C, T> List<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    /// Create a sequence destination.
    pub fn new(variable: &'a mut C) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            post: Vec::default(),
            _phantom: PhantomData,
        }
    }
}

impl<'a, T> List<'a, Vec<T>, T> {
    /// Sort the collected values once the evaluation pass is over.
    pub fn sorted(mut self) -> Self
    where
        T: Ord,
    {
        self.post.push(Box::new(|collection: &mut Vec<T>| {
            collection.sort();
        }));
        self
    }

    /// Drop repeated values (keeping first occurrences) once the evaluation
    /// pass is over.
    pub fn unique(mut self) -> Self
    where
        T: PartialEq,
    {
        self.post.push(Box::new(|collection: &mut Vec<T>| {
            let mut index = 0;
            while index < collection.len() {
                if collection[..index].contains(&collection[index]) {
                    collection.remove(index);
                } else {
                    index += 1;
                }
            }
        }));
        self
    }
}

impl<'a, C, T> Typed<'a, T> for List<'a, C, T>
where
    T: FromStr,
    C: 'a + Collectable<T>,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<T, AssignError> {
        T::from_str(token).map_err(|_| AssignError::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })
    }

    fn commit(&mut self, value: T) -> Result<(), AssignError> {
        (**self.variable.borrow_mut()).add(value);
        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::Many
    }

    fn finish(&mut self) -> Result<(), AssignError> {
        let mut collection = self.variable.borrow_mut();

        for step in &self.post {
            step(&mut **collection);
        }

        Ok(())
    }
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Eq + std::hash::Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

/// A destination that inserts `KEY=VALUE` tokens into an associative container.
pub struct Assoc<'a, M, K, V>
where
    M: 'a + Associative<K, V>,
{
    variable: Rc<RefCell<&'a mut M>>,
    _phantom: PhantomData<(K, V)>,
}

impl<'a, M, K, V> Assoc<'a, M, K, V>
where
    M: 'a + Associative<K, V>,
{
    /// Create an associative destination.
    pub fn new(variable: &'a mut M) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            _phantom: PhantomData,
        }
    }
}

impl<'a, M, K, V> Typed<'a, (K, V)> for Assoc<'a, M, K, V>
where
    K: FromStr,
    V: FromStr,
    M: 'a + Associative<K, V>,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<(K, V), AssignError> {
        let (key, value) = token
            .split_once(PAIR_SEPARATOR)
            .ok_or_else(|| AssignError::Rejected {
                token: token.to_string(),
                message: format!("expected 'KEY{PAIR_SEPARATOR}VALUE'"),
            })?;

        let key = K::from_str(key).map_err(|_| AssignError::InvalidConversion {
            token: key.to_string(),
            type_name: std::any::type_name::<K>(),
        })?;
        let value = V::from_str(value).map_err(|_| AssignError::InvalidConversion {
            token: value.to_string(),
            type_name: std::any::type_name::<V>(),
        })?;

        Ok((key, value))
    }

    fn commit(&mut self, (key, value): (K, V)) -> Result<(), AssignError> {
        (**self.variable.borrow_mut()).put(key, value);
        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::Many
    }
}

impl<K: Eq + std::hash::Hash, V> Associative<K, V> for HashMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K: Ord, V> Associative<K, V> for BTreeMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

/// A destination that fills a fixed-size array positionally.
pub struct Fixed<'a, T, const N: usize> {
    variable: Rc<RefCell<&'a mut [T; N]>>,
    cursor: usize,
}

impl<'a, T, const N: usize> Fixed<'a, T, N> {
    /// Create a fixed-arity destination.
    pub fn new(variable: &'a mut [T; N]) -> Self {
        Self {
            variable: Rc::new(RefCell::new(variable)),
            cursor: 0,
        }
    }
}

impl<'a, T, const N: usize> Typed<'a, T> for Fixed<'a, T, N>
where
    T: FromStr,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<T, AssignError> {
        T::from_str(token).map_err(|_| AssignError::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })
    }

    fn commit(&mut self, value: T) -> Result<(), AssignError> {
        if self.cursor >= N {
            return Err(AssignError::OverCapacity { expected: N });
        }

        self.variable.borrow_mut()[self.cursor] = value;
        self.cursor += 1;
        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::Fixed(N)
    }
}

/// A destination pair: the value fills the first variable, and the second
/// variable receives a fixed complement.
pub struct Pair<'a, A, B> {
    first: Rc<RefCell<&'a mut A>>,
    second: Rc<RefCell<&'a mut B>>,
    complement: Option<B>,
}

impl<'a, A, B> Pair<'a, A, B> {
    /// Create a pair destination.
    pub fn new(first: &'a mut A, second: &'a mut B, complement: B) -> Self {
        Self {
            first: Rc::new(RefCell::new(first)),
            second: Rc::new(RefCell::new(second)),
            complement: Some(complement),
        }
    }
}

impl<'a, A, B> Typed<'a, A> for Pair<'a, A, B>
where
    A: FromStr,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<A, AssignError> {
        A::from_str(token).map_err(|_| AssignError::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<A>(),
        })
    }

    fn commit(&mut self, value: A) -> Result<(), AssignError> {
        **self.first.borrow_mut() = value;

        if let Some(complement) = self.complement.take() {
            **self.second.borrow_mut() = complement;
        }

        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::One
    }
}

/// A destination that invokes a no-argument callback when the key is matched.
pub struct Callback<'a> {
    action: Box<dyn FnMut() + 'a>,
}

impl<'a> Callback<'a> {
    /// Create a callback destination.
    pub fn new(action: impl FnMut() + 'a) -> Self {
        Self {
            action: Box::new(action),
        }
    }
}

impl<'a> Typed<'a, ()> for Callback<'a> {
    fn matched(&mut self) {
        (self.action)();
    }

    fn convert(&self, token: &str) -> Result<(), AssignError> {
        Err(AssignError::Rejected {
            token: token.to_string(),
            message: "a callback takes no value".to_string(),
        })
    }

    fn commit(&mut self, _value: ()) -> Result<(), AssignError> {
        unreachable!("internal error - must not commit on a Callback");
    }

    fn arity(&self) -> Arity {
        Arity::None
    }
}

/// A destination that invokes a callback with each converted value.
pub struct CallbackValue<'a, T> {
    action: Box<dyn FnMut(T) + 'a>,
}

impl<'a, T> CallbackValue<'a, T> {
    /// Create a value callback destination.
    pub fn new(action: impl FnMut(T) + 'a) -> Self {
        Self {
            action: Box::new(action),
        }
    }
}

impl<'a, T> Typed<'a, T> for CallbackValue<'a, T>
where
    T: FromStr,
{
    fn matched(&mut self) {
        // Do nothing.
    }

    fn convert(&self, token: &str) -> Result<T, AssignError> {
        T::from_str(token).map_err(|_| AssignError::InvalidConversion {
            token: token.to_string(),
            type_name: std::any::type_name::<T>(),
        })
    }

    fn commit(&mut self, value: T) -> Result<(), AssignError> {
        (self.action)(value);
        Ok(())
    }

    fn arity(&self) -> Arity {
        Arity::One
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec() {
        let mut collection: Vec<u32> = Vec::default();
        collection.add(1);
        collection.add(0);
        assert_eq!(collection, vec![1, 0]);
    }

    #[test]
    fn hash_set() {
        let mut collection: HashSet<u32> = HashSet::default();
        collection.add(1);
        collection.add(0);
        collection.add(1);
        assert_eq!(collection, HashSet::from([1, 0]));
    }

    #[test]
    fn maps() {
        let mut map: HashMap<String, u32> = HashMap::default();
        map.put("a".to_string(), 1);
        map.put("a".to_string(), 2);
        assert_eq!(map, HashMap::from([("a".to_string(), 2)]));

        let mut map: BTreeMap<String, u32> = BTreeMap::default();
        map.put("b".to_string(), 1);
        map.put("a".to_string(), 2);
        assert_eq!(
            map,
            BTreeMap::from([("a".to_string(), 2), ("b".to_string(), 1)])
        );
    }

    #[test]
    fn scalar_commit() {
        // Integer
        let mut variable: u32 = u32::default();
        let mut scalar = Scalar::new(&mut variable);
        let value = scalar.convert("5").unwrap();
        scalar.commit(value).unwrap();
        drop(scalar);
        assert_eq!(variable, 5);

        // Boolean
        let mut variable: bool = false;
        let mut scalar = Scalar::new(&mut variable);
        let value = scalar.convert("true").unwrap();
        scalar.commit(value).unwrap();
        drop(scalar);
        assert!(variable);
    }

    #[test]
    fn scalar_inconvertable() {
        let mut variable: u32 = u32::default();
        let scalar = Scalar::new(&mut variable);
        assert_matches!(
            scalar.convert("blah").unwrap_err(),
            AssignError::InvalidConversion { .. }
        );
    }

    #[test]
    fn optional_commit() {
        let mut variable: Option<u32> = None;
        let mut optional = Optional::new(&mut variable);
        let value = optional.convert("1").unwrap();
        optional.commit(value).unwrap();
        drop(optional);
        assert_eq!(variable, Some(1));
    }

    #[test]
    fn switch_matched() {
        let mut variable: u32 = u32::default();
        let mut switch = Switch::new(&mut variable, 2);
        switch.matched();
        switch.matched();
        drop(switch);
        assert_eq!(variable, 2);
    }

    #[test]
    fn switch_convert_rejected() {
        let mut variable: u32 = u32::default();
        let switch = Switch::new(&mut variable, 2);
        assert_matches!(switch.convert("5").unwrap_err(), AssignError::Rejected { .. });
    }

    #[test]
    fn list_commit() {
        let mut variable: Vec<u32> = Vec::default();
        let mut list = List::new(&mut variable);
        let value = list.convert("1").unwrap();
        list.commit(value).unwrap();
        let value = list.convert("0").unwrap();
        list.commit(value).unwrap();
        list.finish().unwrap();
        drop(list);
        assert_eq!(variable, vec![1, 0]);
    }

    #[test]
    fn list_sorted_unique() {
        let mut variable: Vec<u32> = Vec::default();
        let mut list = List::new(&mut variable).sorted().unique();

        for token in ["3", "1", "3", "2", "1"] {
            let value = list.convert(token).unwrap();
            list.commit(value).unwrap();
        }

        list.finish().unwrap();
        drop(list);
        assert_eq!(variable, vec![1, 2, 3]);
    }

    #[test]
    fn list_unique_keeps_first() {
        let mut variable: Vec<u32> = Vec::default();
        let mut list = List::new(&mut variable).unique();

        for token in ["3", "1", "3", "2", "1"] {
            let value = list.convert(token).unwrap();
            list.commit(value).unwrap();
        }

        list.finish().unwrap();
        drop(list);
        assert_eq!(variable, vec![3, 1, 2]);
    }

    #[test]
    fn assoc_commit() {
        let mut variable: HashMap<String, u32> = HashMap::default();
        let mut assoc = Assoc::new(&mut variable);
        let value = assoc.convert("a=1").unwrap();
        assoc.commit(value).unwrap();
        let value = assoc.convert("b=2").unwrap();
        assoc.commit(value).unwrap();
        drop(assoc);
        assert_eq!(
            variable,
            HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)])
        );
    }

    #[test]
    fn assoc_without_separator() {
        let mut variable: HashMap<String, u32> = HashMap::default();
        let assoc = Assoc::new(&mut variable);
        assert_matches!(assoc.convert("a-1").unwrap_err(), AssignError::Rejected { .. });
    }

    #[test]
    fn fixed_commit() {
        let mut variable: [u32; 2] = [0, 0];
        let mut fixed = Fixed::new(&mut variable);
        let value = fixed.convert("7").unwrap();
        fixed.commit(value).unwrap();
        let value = fixed.convert("9").unwrap();
        fixed.commit(value).unwrap();

        let value = fixed.convert("11").unwrap();
        assert_matches!(
            fixed.commit(value).unwrap_err(),
            AssignError::OverCapacity { expected: 2 }
        );

        drop(fixed);
        assert_eq!(variable, [7, 9]);
    }

    #[test]
    fn pair_commit() {
        let mut path: String = String::default();
        let mut explicit: bool = false;
        let mut pair = Pair::new(&mut path, &mut explicit, true);
        let value = pair.convert("/tmp/out").unwrap();
        pair.commit(value).unwrap();
        drop(pair);
        assert_eq!(path, "/tmp/out");
        assert!(explicit);
    }

    #[test]
    fn callback_matched() {
        let mut count: u32 = 0;
        {
            let mut callback = Callback::new(|| count += 1);
            callback.matched();
            callback.matched();
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn callback_value_commit() {
        let mut collected: Vec<u32> = Vec::default();
        {
            let mut callback = CallbackValue::new(|value: u32| collected.push(value));
            let value = callback.convert("5").unwrap();
            callback.commit(value).unwrap();
        }
        assert_eq!(collected, vec![5]);
    }

    #[test]
    fn arities() {
        let mut variable: u32 = u32::default();
        assert_eq!(Scalar::new(&mut variable).arity(), Arity::One);

        let mut variable: u32 = u32::default();
        assert_eq!(Switch::new(&mut variable, 2).arity(), Arity::None);

        let mut variable: Option<u32> = None;
        assert_eq!(Optional::new(&mut variable).arity(), Arity::One);

        let mut variable: Vec<u32> = Vec::default();
        assert_eq!(List::new(&mut variable).arity(), Arity::Many);

        let mut variable: HashMap<String, u32> = HashMap::default();
        assert_eq!(Assoc::new(&mut variable).arity(), Arity::Many);

        let mut variable: [u32; 3] = [0; 3];
        assert_eq!(Fixed::new(&mut variable).arity(), Arity::Fixed(3));

        assert_eq!(Callback::new(|| {}).arity(), Arity::None);
        assert_eq!(CallbackValue::new(|_: u32| {}).arity(), Arity::One);
    }
}
