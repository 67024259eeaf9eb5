pub mod kurs;
