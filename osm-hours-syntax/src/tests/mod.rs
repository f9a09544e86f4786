mod prettify;
