//! Dense tables keyed by the fixed taxonomies.

use std::ops::{Index, IndexMut};

use bahamas_frontend::{DefectCategory, Stage, UcaType};

macro_rules! keyed_table {
    ($(#[$meta:meta])* $name:ident, $key:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T>([T; <$key>::COUNT]);

        impl<T> $name<T> {
            /// Build the table by evaluating `f` for every key in fixed order.
            pub fn from_fn(mut f: impl FnMut($key) -> T) -> Self {
                Self(std::array::from_fn(|i| f(<$key>::ALL[i])))
            }

            /// Fallible variant of [`Self::from_fn`]; stops at the first error.
            pub fn try_from_fn<E>(mut f: impl FnMut($key) -> Result<T, E>) -> Result<Self, E> {
                let mut values = Vec::with_capacity(<$key>::COUNT);
                for key in <$key>::ALL {
                    values.push(f(key)?);
                }
                match values.try_into() {
                    Ok(array) => Ok(Self(array)),
                    Err(_) => unreachable!("one value per key"),
                }
            }

            pub fn iter(&self) -> impl Iterator<Item = ($key, &T)> + '_ {
                <$key>::ALL.into_iter().zip(self.0.iter())
            }

            pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
                self.0.iter()
            }

            pub fn map<U>(&self, mut f: impl FnMut($key, &T) -> U) -> $name<U> {
                $name::from_fn(|k| f(k, &self.0[k.index()]))
            }
        }

        impl<T> Index<$key> for $name<T> {
            type Output = T;

            fn index(&self, key: $key) -> &T {
                &self.0[key.index()]
            }
        }

        impl<T> IndexMut<$key> for $name<T> {
            fn index_mut(&mut self, key: $key) -> &mut T {
                &mut self.0[key.index()]
            }
        }
    };
}

keyed_table! {
    /// One value per lifecycle stage.
    ByStage, Stage
}

keyed_table! {
    /// One value per defect category.
    ByDefect, DefectCategory
}

keyed_table! {
    /// One value per UCA type.
    ByUca, UcaType
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_follow_taxonomy_order() {
        let t = ByStage::from_fn(|s| s.index() * 10);
        assert_eq!(t[Stage::Design], 20);
        let keys: Vec<Stage> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, Stage::ALL.to_vec());
    }

    #[test]
    fn try_from_fn_stops_on_error() {
        let mut visited = 0;
        let result: Result<ByUca<u8>, &str> = ByUca::try_from_fn(|u| {
            visited += 1;
            if u == UcaType::B {
                Err("boom")
            } else {
                Ok(1)
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(visited, 2);
    }

    #[test]
    fn map_and_index_mut() {
        let mut t = ByDefect::from_fn(|_| 1.0);
        t[DefectCategory::Timing] = 3.0;
        let doubled = t.map(|_, v| v * 2.0);
        assert_eq!(doubled[DefectCategory::Timing], 6.0);
        assert_eq!(doubled.values().sum::<f64>(), 2.0 * 7.0 + 6.0);
    }
}
