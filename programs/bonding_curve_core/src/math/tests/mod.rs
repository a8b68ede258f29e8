#[cfg(test)]
mod unit_tests;

#[cfg(test)]
mod property_tests;
